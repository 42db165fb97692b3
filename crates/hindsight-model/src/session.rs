//! Session grouping and task positions

use crate::types::Task;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered group of tasks belonging to one end-user conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Session {
    /// Tasks ordered by arrival time, ascending. Positions are recomputed
    /// from this order on every read; inserting a task with an earlier
    /// timestamp renumbers everything after it.
    pub fn tasks_by_time(&self) -> Vec<&Task> {
        let mut ordered: Vec<&Task> = self.tasks.iter().collect();
        ordered.sort_by_key(|t| t.created_at);
        ordered
    }

    /// 1-based index of a task within the session's chronological order
    pub fn task_position(&self, task_id: &str) -> Option<usize> {
        self.tasks_by_time()
            .iter()
            .position(|t| t.id == task_id)
            .map(|i| i + 1)
    }

    /// Union of event names across the session's tasks, sorted
    pub fn event_names(&self) -> Vec<String> {
        crate::types::distinct_event_names(&self.tasks)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Reconstruct sessions from a flat task export. Session-less tasks are
/// skipped; the store's GET boundary returns sessions directly, this exists
/// for local analysis of exported records.
pub fn group_into_sessions(tasks: &[Task]) -> Vec<Session> {
    let mut by_id: BTreeMap<String, Session> = BTreeMap::new();
    for task in tasks {
        let Some(session_id) = &task.session_id else {
            continue;
        };
        by_id
            .entry(session_id.clone())
            .or_insert_with(|| Session {
                id: session_id.clone(),
                project_id: task.project_id.clone(),
                tasks: Vec::new(),
            })
            .tasks
            .push(task.clone());
    }
    by_id.into_values().collect()
}
