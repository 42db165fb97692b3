//! Annotation mutation protocol: optimistic edits reconciled with the store

mod protocol;

pub use protocol::{Annotator, MutationOutcome, MutationState};
