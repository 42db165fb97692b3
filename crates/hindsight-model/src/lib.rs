//! Entity types and invariants for logged AI interactions

mod error;
mod io;
mod session;
mod types;

pub use error::{Error, Result};
pub use io::{append_jsonl, read_jsonl};
pub use session::{group_into_sessions, Session};
pub use types::{distinct_event_names, Event, EventDefinition, EventSource, Flag, Project, Task};
