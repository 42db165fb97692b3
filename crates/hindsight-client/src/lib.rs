//! External store boundary: wire types, the mutation trait, HTTP client

mod http;
mod store;
mod wire;

pub use http::StoreClient;
pub use store::TaskStore;
pub use wire::{AggregationRequest, ErrorReply, TaskUpdate};
