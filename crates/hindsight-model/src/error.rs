//! Error taxonomy shared across the workspace

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the annotation and aggregation core.
///
/// `Validation` and `Conflict` are rejected locally before any network
/// call; `NotFound` and `Transport` come back from the external store.
/// None of these are fatal: unrelated requests keep being served.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store request failed: {0}")]
    Transport(String),

    #[error("a mutation is already pending for task {0}")]
    Conflict(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport(message.into())
    }
}
