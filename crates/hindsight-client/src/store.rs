//! Mutation boundary trait

use async_trait::async_trait;
use hindsight_model::{Event, Flag, Result, Task};

/// The external store is the authority for task mutations; the protocol
/// layer proposes changes through this seam and reconciles with the echoed
/// task. Implementations make a single attempt per call, no retry.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Replace a task's event list; echoes the confirmed task
    async fn update_events(&self, task_id: &str, events: &[Event]) -> Result<Task>;

    /// Set a task's verdict; echoes the confirmed task
    async fn set_flag(&self, task_id: &str, flag: Flag) -> Result<Task>;
}
