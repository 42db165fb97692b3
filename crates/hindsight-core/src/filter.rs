//! Conjunctive task filter shared by table views and aggregation requests

use hindsight_model::{Flag, Task};
use serde::{Deserialize, Serialize};

/// Predicate narrowing a task set by flag and/or event name.
///
/// A `None` field means no constraint; set fields combine with logical AND.
/// The same value serializes as the `tasks_filter` object of an aggregation
/// request, so filtering locally and filtering at the store agree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub flag: Option<Flag>,
    #[serde(default)]
    pub event_name: Option<String>,
}

impl TaskFilter {
    /// The identity filter keeps every task
    pub fn is_identity(&self) -> bool {
        self.flag.is_none() && self.event_name.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(flag) = self.flag {
            if task.flag != flag {
                return false;
            }
        }
        if let Some(event_name) = &self.event_name {
            if !task.has_event(event_name) {
                return false;
            }
        }
        true
    }

    /// Order-preserving selection; pure, total
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}
