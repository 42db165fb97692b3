//! In-memory request dedup and staleness guards for aggregation queries

mod cache;
mod staleness;

pub use cache::{CacheKey, RequestCache, TimeWindow};
pub use staleness::LatestRequest;
