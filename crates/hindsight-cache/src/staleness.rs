//! Last-request-wins guard for superseded aggregation responses

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Tracks which request a view is waiting for, so a response that was
/// superseded (the filter changed before it returned) is ignored on arrival
/// instead of overwriting a fresher view.
pub struct LatestRequest<V> {
    issued: AtomicU64,
    current: Mutex<Option<(u64, V)>>,
}

impl<V> LatestRequest<V> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Hand out the identity of a request about to be issued; every call
    /// supersedes all earlier ids
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Accept an arriving response only if no newer request has been issued
    /// since. Returns whether the value was applied.
    pub fn try_commit(&self, id: u64, value: V) -> bool {
        if id != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(id, "ignoring stale response");
            return false;
        }
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Some((id, value));
        true
    }

    /// The most recently applied value, if any
    pub fn latest(&self) -> Option<V>
    where
        V: Clone,
    {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|(_, v)| v.clone())
    }
}

impl<V> Default for LatestRequest<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_request_wins() {
        let guard: LatestRequest<&str> = LatestRequest::new();

        let first = guard.issue();
        let second = guard.issue();

        // The newer request returns first; the older arrival is ignored.
        assert!(guard.try_commit(second, "fresh"));
        assert!(!guard.try_commit(first, "stale"));
        assert_eq!(guard.latest(), Some("fresh"));
    }

    #[test]
    fn test_single_request_commits() {
        let guard: LatestRequest<u32> = LatestRequest::new();
        let id = guard.issue();
        assert!(guard.try_commit(id, 5));
        assert_eq!(guard.latest(), Some(5));
    }

    #[test]
    fn test_superseded_before_any_commit() {
        let guard: LatestRequest<u32> = LatestRequest::new();
        let first = guard.issue();
        let _second = guard.issue();

        assert!(!guard.try_commit(first, 1));
        assert_eq!(guard.latest(), None);
    }
}
