use hindsight_cache::{CacheKey, LatestRequest, RequestCache, TimeWindow};
use hindsight_core::{MetricName, TaskFilter, TasksMetrics};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn key(metric: MetricName) -> CacheKey {
    CacheKey {
        project_id: "proj_1".to_string(),
        metric,
        filter: TaskFilter::default(),
        window: TimeWindow::unbounded(),
    }
}

#[tokio::test]
async fn test_concurrent_views_share_one_computation() {
    let cache: Arc<RequestCache<TasksMetrics>> = Arc::new(RequestCache::new());
    let computations = Arc::new(AtomicUsize::new(0));

    let compute = |count: Arc<AtomicUsize>| async move {
        count.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(25)).await;
        TasksMetrics {
            total_nb_tasks: Some(12),
            ..Default::default()
        }
    };

    // Three views ask for the same metric with the same filter at once.
    let (a, b, c) = tokio::join!(
        cache.get_or_compute(key(MetricName::TotalNbTasks), || compute(computations.clone())),
        cache.get_or_compute(key(MetricName::TotalNbTasks), || compute(computations.clone())),
        cache.get_or_compute(key(MetricName::TotalNbTasks), || compute(computations.clone())),
    );

    assert_eq!(computations.load(Ordering::SeqCst), 1);
    assert_eq!(a.total_nb_tasks, Some(12));
    assert_eq!(b, a);
    assert_eq!(c, a);
}

#[tokio::test]
async fn test_different_filters_are_different_keys() {
    let cache: RequestCache<usize> = RequestCache::new();
    let computations = Arc::new(AtomicUsize::new(0));

    let mut filtered = key(MetricName::TotalNbTasks);
    filtered.filter = TaskFilter {
        flag: None,
        event_name: Some("bug".to_string()),
    };

    for k in [key(MetricName::TotalNbTasks), filtered] {
        let computations = computations.clone();
        cache
            .get_or_compute(k, || async move {
                computations.fetch_add(1, Ordering::SeqCst)
            })
            .await;
    }
    assert_eq!(computations.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_superseded_response_is_ignored() {
    // A view switches filters before the first response lands: the slow
    // first answer must not overwrite the fresher one.
    let guard: LatestRequest<&str> = LatestRequest::new();

    let all_tasks = guard.issue();
    let only_bugs = guard.issue();

    assert!(guard.try_commit(only_bugs, "bugs view"));
    assert!(!guard.try_commit(all_tasks, "all view"));
    assert_eq!(guard.latest(), Some("bugs view"));
}
