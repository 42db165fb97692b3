//! Memoization keyed by (project, metric, filter, window)

use hindsight_core::{MetricName, TaskFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Time bound on an aggregation request, Unix seconds, inclusive.
/// `None` on a side means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start.map_or(true, |s| timestamp >= s) && self.end.map_or(true, |e| timestamp <= e)
    }
}

/// Identity of one aggregation request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub project_id: String,
    pub metric: MetricName,
    pub filter: TaskFilter,
    pub window: TimeWindow,
}

/// Dedup/memoization layer over the aggregation boundary.
///
/// At most one computation runs per key: concurrent requests with an
/// identical key attach to the in-flight result instead of recomputing.
/// Entries live until the project's data changes (`invalidate_project`);
/// nothing persists across restarts.
pub struct RequestCache<V> {
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<V>>>>,
}

impl<V: Clone> RequestCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, or run `compute` to fill it.
    /// A second caller arriving while `compute` is outstanding awaits the
    /// same cell rather than starting another computation.
    pub async fn get_or_compute<F, Fut>(&self, key: CacheKey, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = {
            let mut entries = self.lock_entries();
            entries
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };
        cell.get_or_init(compute).await.clone()
    }

    /// Drop every key of a project after its task/event/session data
    /// changed; the next request for any of them recomputes
    pub fn invalidate_project(&self, project_id: &str) {
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|key, _| key.project_id != project_id);
        tracing::debug!(
            project_id,
            dropped = before - entries.len(),
            "invalidated cached aggregates"
        );
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Arc<OnceCell<V>>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<V: Clone> Default for RequestCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(project_id: &str, metric: MetricName) -> CacheKey {
        CacheKey {
            project_id: project_id.to_string(),
            metric,
            filter: TaskFilter::default(),
            window: TimeWindow::unbounded(),
        }
    }

    #[tokio::test]
    async fn test_concurrent_identical_keys_compute_once() {
        let cache = Arc::new(RequestCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let compute = |calls: Arc<AtomicUsize>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            42usize
        };

        let k = key("proj_1", MetricName::TotalNbTasks);
        let (a, b) = tokio::join!(
            cache.get_or_compute(k.clone(), || compute(calls.clone())),
            cache.get_or_compute(k.clone(), || compute(calls.clone())),
        );

        assert_eq!(a, 42);
        assert_eq!(b, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_compute_separately() {
        let cache: RequestCache<usize> = RequestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for metric in [MetricName::TotalNbTasks, MetricName::GlobalSuccessRate] {
            let calls = calls.clone();
            cache
                .get_or_compute(key("proj_1", metric), || async move {
                    calls.fetch_add(1, Ordering::SeqCst)
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidation_forces_recompute() {
        let cache: RequestCache<usize> = RequestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let k = key("proj_1", MetricName::TotalNbTasks);
        for _ in 0..2 {
            let calls = calls.clone();
            cache
                .get_or_compute(k.clone(), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    7usize
                })
                .await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1, "second request served from cache");

        cache.invalidate_project("proj_1");
        assert!(cache.is_empty());

        let calls2 = calls.clone();
        cache
            .get_or_compute(k, || async move {
                calls2.fetch_add(1, Ordering::SeqCst);
                7usize
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidation_scoped_to_project() {
        let cache: RequestCache<usize> = RequestCache::new();
        cache
            .get_or_compute(key("proj_1", MetricName::TotalNbTasks), || async { 1 })
            .await;
        cache
            .get_or_compute(key("proj_2", MetricName::TotalNbTasks), || async { 2 })
            .await;

        cache.invalidate_project("proj_1");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_window_contains() {
        let window = TimeWindow {
            start: Some(100),
            end: Some(200),
        };
        assert!(window.contains(100));
        assert!(window.contains(200));
        assert!(!window.contains(99));
        assert!(!window.contains(201));
        assert!(TimeWindow::unbounded().contains(i64::MIN));
    }

    #[test]
    fn test_keys_differ_by_filter() {
        let a = key("proj_1", MetricName::TotalNbTasks);
        let mut b = a.clone();
        b.filter.event_name = Some("bug".to_string());
        assert_ne!(a, b);
    }
}
