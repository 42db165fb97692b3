//! Task, event and project record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Human/automated verdict on a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Success,
    Failure,
    #[default]
    Unset,
}

impl Flag {
    /// Whether a human or detector verdict has been recorded
    pub fn is_labelled(self) -> bool {
        !matches!(self, Flag::Unset)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Flag::Success => "success",
            Flag::Failure => "failure",
            Flag::Unset => "unset",
        }
    }
}

/// Origin of an event: human annotation or an automated detector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventSource {
    Human,
    Detector(String),
}

impl EventSource {
    pub fn as_str(&self) -> &str {
        match self {
            EventSource::Human => "owner",
            EventSource::Detector(name) => name,
        }
    }
}

impl From<String> for EventSource {
    fn from(value: String) -> Self {
        if value == "owner" {
            EventSource::Human
        } else {
            EventSource::Detector(value)
        }
    }
}

impl From<EventSource> for String {
    fn from(value: EventSource) -> Self {
        value.as_str().to_string()
    }
}

/// Vocabulary entry describing a taggable event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Project owning tasks, sessions and the event vocabulary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// event_name -> definition; the allowed vocabulary for this project
    #[serde(default)]
    pub events: HashMap<String, EventDefinition>,
}

impl Project {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            events: HashMap::new(),
        }
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    pub fn event(&self, name: &str) -> Option<&EventDefinition> {
        self.events.get(name)
    }

    /// Grow the vocabulary; an existing definition with the same name is replaced
    pub fn define_event(&mut self, definition: EventDefinition) {
        self.events.insert(definition.name.clone(), definition);
    }
}

/// A named tag attached to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub task_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    pub project_id: String,
    pub event_name: String,
    pub source: EventSource,
    /// Unix timestamp, seconds
    pub created_at: i64,
}

/// A single logged interaction (input/output pair) within a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Unix timestamp, seconds
    pub created_at: i64,
    pub input: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default, deserialize_with = "flag_or_unset")]
    pub flag: Flag,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Task {
    pub fn has_event(&self, name: &str) -> bool {
        self.events.iter().any(|e| e.event_name == name)
    }

    /// Creation time as a UTC datetime; None for out-of-range timestamps
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

/// Unique event names across a task set, sorted for stable display
pub fn distinct_event_names(tasks: &[Task]) -> Vec<String> {
    let mut names: Vec<String> = tasks
        .iter()
        .flat_map(|t| t.events.iter().map(|e| e.event_name.clone()))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// The store serializes an absent verdict as a missing field or null
fn flag_or_unset<'de, D>(deserializer: D) -> Result<Flag, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Flag>::deserialize(deserializer)?.unwrap_or_default())
}
