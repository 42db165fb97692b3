//! Request/response shapes of the external store

use hindsight_core::{MetricName, TaskFilter};
use hindsight_model::{Event, Flag};
use serde::{Deserialize, Serialize};

/// Body of the aggregation query POST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationRequest {
    pub metrics: Vec<MetricName>,
    pub tasks_filter: TaskFilter,
}

/// Mutation body carrying the new event list or the new flag for a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<Flag>,
}

impl TaskUpdate {
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: Some(events),
            flag: None,
        }
    }

    pub fn with_flag(flag: Flag) -> Self {
        Self {
            events: None,
            flag: Some(flag),
        }
    }
}

/// Error payload the store returns on failed requests
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}
