use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context};
use hindsight_cache::{CacheKey, RequestCache, TimeWindow};
use hindsight_client::{AggregationRequest, StoreClient};
use hindsight_core::{
    compute_metrics, labelling_progress, CoreConfig, MetricName, MetricsQuery, TaskFilter,
    TasksMetrics,
};
use hindsight_model::{group_into_sessions, read_jsonl, Task};

use crate::cli::{FilterArgs, StoreArgs};
use crate::commands::{build_filter, runtime};

pub fn run(
    file: Option<&str>,
    store: Option<&StoreArgs>,
    filter_args: &FilterArgs,
    metric_names: &[String],
) -> anyhow::Result<()> {
    let filter = build_filter(filter_args)?;
    let metrics = parse_metric_names(metric_names)?;
    let config = CoreConfig::new();

    let mut output = serde_json::json!({});
    match (file, store) {
        (Some(path), _) => {
            let tasks: Vec<Task> = read_jsonl(Path::new(path))
                .with_context(|| format!("reading task export {path}"))?;
            let sessions = group_into_sessions(&tasks);
            let computed = compute_metrics(&MetricsQuery {
                tasks: &tasks,
                sessions: &sessions,
                filter: &filter,
                metrics: &metrics,
                config: &config,
            });
            let filtered = filter.apply(&tasks);
            output["metrics"] = serde_json::to_value(&computed)?;
            output["labelling"] = serde_json::to_value(labelling_progress(
                &filtered,
                config.enough_labelled_tasks,
            ))?;
        }
        (None, Some(store)) => {
            let fetched = fetch_aggregates(store, &filter, &metrics)?;
            output["metrics"] = serde_json::to_value(&fetched)?;
        }
        (None, None) => bail!("provide --file or --api-url/--api-key/--project"),
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_metric_names(names: &[String]) -> anyhow::Result<Vec<MetricName>> {
    if names.is_empty() {
        return Ok(MetricName::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| MetricName::from_str(name).map_err(anyhow::Error::from))
        .collect()
}

/// One aggregation request per metric, deduplicated through the cache the
/// way dashboard views share in-flight queries
fn fetch_aggregates(
    store: &StoreArgs,
    filter: &TaskFilter,
    metrics: &[MetricName],
) -> anyhow::Result<TasksMetrics> {
    let rt = runtime()?;
    let client = Arc::new(StoreClient::new(&store.api_url, &store.api_key));
    let cache: RequestCache<TasksMetrics> = RequestCache::new();

    rt.block_on(async {
        let mut merged = TasksMetrics::default();
        for &metric in metrics {
            let key = CacheKey {
                project_id: store.project.clone(),
                metric,
                filter: filter.clone(),
                window: TimeWindow::unbounded(),
            };
            let client = client.clone();
            let project = store.project.clone();
            let request = AggregationRequest {
                metrics: vec![metric],
                tasks_filter: filter.clone(),
            };
            let partial = cache
                .get_or_compute(key, || async move {
                    match client.aggregate_metrics(&project, &request).await {
                        Ok(partial) => partial,
                        Err(err) => {
                            // A failed metric degrades to its sentinel
                            // without failing the rest of the request.
                            tracing::warn!(metric = metric.as_str(), error = %err, "metric degraded");
                            TasksMetrics::default()
                        }
                    }
                })
                .await;
            merge(&mut merged, partial);
        }
        Ok(merged)
    })
}

fn merge(into: &mut TasksMetrics, from: TasksMetrics) {
    into.total_nb_tasks = into.total_nb_tasks.or(from.total_nb_tasks);
    into.global_success_rate = into.global_success_rate.or(from.global_success_rate);
    into.most_detected_event = into.most_detected_event.take().or(from.most_detected_event);
    into.nb_daily_tasks = into.nb_daily_tasks.take().or(from.nb_daily_tasks);
    into.daily_success_rate = into.daily_success_rate.take().or(from.daily_success_rate);
    into.events_ranking = into.events_ranking.take().or(from.events_ranking);
    into.success_rate_per_task_position = into
        .success_rate_per_task_position
        .take()
        .or(from.success_rate_per_task_position);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metric_names_defaults_to_all() {
        let metrics = parse_metric_names(&[]).unwrap();
        assert_eq!(metrics.len(), MetricName::ALL.len());
    }

    #[test]
    fn test_parse_metric_names_rejects_unknown() {
        assert!(parse_metric_names(&["total_nb_tasks".to_string()]).is_ok());
        assert!(parse_metric_names(&["bogus".to_string()]).is_err());
    }

    #[test]
    fn test_merge_keeps_first_filled_value() {
        let mut merged = TasksMetrics {
            total_nb_tasks: Some(3),
            ..Default::default()
        };
        merge(
            &mut merged,
            TasksMetrics {
                total_nb_tasks: Some(99),
                global_success_rate: Some(0.5),
                ..Default::default()
            },
        );
        assert_eq!(merged.total_nb_tasks, Some(3));
        assert_eq!(merged.global_success_rate, Some(0.5));
    }
}
