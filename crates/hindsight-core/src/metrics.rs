//! Dashboard metric reductions over a filtered task set
//!
//! Every function here is a pure reduction: no hidden state, no cross-call
//! memory. Empty-denominator cases return `None` ("insufficient data")
//! instead of a fabricated number.

use crate::config::CoreConfig;
use crate::filter::TaskFilter;
use chrono::NaiveDate;
use hindsight_model::{Error, Flag, Session, Task};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

const SECONDS_PER_DAY: i64 = 86_400;

/// Wire names of the dashboard metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    TotalNbTasks,
    GlobalSuccessRate,
    MostDetectedEvent,
    NbDailyTasks,
    DailySuccessRate,
    EventsRanking,
    SuccessRatePerTaskPosition,
}

impl MetricName {
    pub const ALL: [MetricName; 7] = [
        MetricName::TotalNbTasks,
        MetricName::GlobalSuccessRate,
        MetricName::MostDetectedEvent,
        MetricName::NbDailyTasks,
        MetricName::DailySuccessRate,
        MetricName::EventsRanking,
        MetricName::SuccessRatePerTaskPosition,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricName::TotalNbTasks => "total_nb_tasks",
            MetricName::GlobalSuccessRate => "global_success_rate",
            MetricName::MostDetectedEvent => "most_detected_event",
            MetricName::NbDailyTasks => "nb_daily_tasks",
            MetricName::DailySuccessRate => "daily_success_rate",
            MetricName::EventsRanking => "events_ranking",
            MetricName::SuccessRatePerTaskPosition => "success_rate_per_task_position",
        }
    }
}

impl FromStr for MetricName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricName::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::validation(format!("unknown metric: {s}")))
    }
}

/// One calendar-day bucket of task counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTaskCount {
    /// Short weekday label for chart axes, e.g. "Mon"
    pub day: String,
    pub date: NaiveDate,
    pub nb_tasks: usize,
}

/// One calendar-day bucket of success rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySuccessRate {
    pub day: String,
    pub date: NaiveDate,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCount {
    pub event_name: String,
    pub nb_events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSuccessRate {
    pub task_position: usize,
    pub success_rate: f64,
}

/// Whether enough tasks carry a human verdict for evaluation to be trusted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabellingProgress {
    pub currently_labelled_tasks: usize,
    pub enough_labelled_tasks: usize,
    pub has_enough_labelled_tasks: bool,
}

/// Aggregation response: one field per requested metric, `null` otherwise.
///
/// Metrics are independent; one degrading to its sentinel never fails the
/// others in the same request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TasksMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_nb_tasks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_success_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_detected_event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_daily_tasks: Option<Vec<DailyTaskCount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_success_rate: Option<Vec<DailySuccessRate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_ranking: Option<Vec<EventCount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate_per_task_position: Option<Vec<PositionSuccessRate>>,
}

/// Batch aggregation input: an unfiltered task set plus the filter to apply,
/// session context for position metrics, and the metrics to compute
#[derive(Debug, Clone, Copy)]
pub struct MetricsQuery<'a> {
    pub tasks: &'a [Task],
    pub sessions: &'a [Session],
    pub filter: &'a TaskFilter,
    pub metrics: &'a [MetricName],
    pub config: &'a CoreConfig,
}

pub fn total_nb_tasks(tasks: &[Task]) -> usize {
    tasks.len()
}

/// Fraction of successes among labelled tasks; `None` when nothing is labelled.
///
/// Unset tasks are excluded from the denominator. The result is the exact
/// fraction in `[0, 1]`; percentage formatting belongs to the caller.
pub fn global_success_rate(tasks: &[Task]) -> Option<f64> {
    success_rate(tasks.iter())
}

/// The most frequent event name across the task set's events.
/// Ties resolve to the lexicographically smallest name.
pub fn most_detected_event(tasks: &[Task]) -> Option<String> {
    let counts = count_events(tasks.iter());
    rank_events(counts).into_iter().next().map(|e| e.event_name)
}

/// Tasks bucketed by UTC calendar day, chronological
pub fn nb_daily_tasks(tasks: &[Task]) -> Vec<DailyTaskCount> {
    day_buckets(tasks)
        .into_iter()
        .map(|(date, bucket)| DailyTaskCount {
            day: weekday_label(date),
            date,
            nb_tasks: bucket.len(),
        })
        .collect()
}

/// Per-day success rate; days where nothing is labelled are omitted
pub fn daily_success_rate(tasks: &[Task]) -> Vec<DailySuccessRate> {
    day_buckets(tasks)
        .into_iter()
        .filter_map(|(date, bucket)| {
            success_rate(bucket.into_iter()).map(|rate| DailySuccessRate {
                day: weekday_label(date),
                date,
                success_rate: rate,
            })
        })
        .collect()
}

/// Event occurrence counts over the trailing window ending at the latest
/// task timestamp in the set; sorted by count descending, ties ascending
/// by name
pub fn events_ranking(tasks: &[Task], window_days: i64) -> Vec<EventCount> {
    let Some(latest) = tasks.iter().map(|t| t.created_at).max() else {
        return Vec::new();
    };
    let window_start = latest - window_days * SECONDS_PER_DAY;
    let counts = count_events(tasks.iter().filter(|t| t.created_at >= window_start));
    rank_events(counts)
}

/// Success rate grouped by the task's 1-based position within its session.
///
/// Positions are resolved against the full session sequence, not the
/// filtered subset. Returns `None` when no task in the set belongs to a
/// session (the metric is unavailable, which is distinct from an empty
/// result).
pub fn success_rate_per_task_position(
    tasks: &[Task],
    sessions: &[Session],
) -> Option<Vec<PositionSuccessRate>> {
    let by_id: HashMap<&str, &Session> = sessions.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut any_in_session = false;
    let mut groups: BTreeMap<usize, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        let Some(session_id) = &task.session_id else {
            continue;
        };
        any_in_session = true;
        let Some(position) = by_id
            .get(session_id.as_str())
            .and_then(|s| s.task_position(&task.id))
        else {
            continue;
        };
        groups.entry(position).or_default().push(task);
    }

    if !any_in_session {
        return None;
    }

    Some(
        groups
            .into_iter()
            .filter_map(|(position, group)| {
                success_rate(group.into_iter()).map(|rate| PositionSuccessRate {
                    task_position: position,
                    success_rate: rate,
                })
            })
            .collect(),
    )
}

/// Compare the count of human-labelled tasks against the configured threshold
pub fn labelling_progress(tasks: &[Task], enough_labelled: usize) -> LabellingProgress {
    let currently_labelled = tasks.iter().filter(|t| t.flag.is_labelled()).count();
    LabellingProgress {
        currently_labelled_tasks: currently_labelled,
        enough_labelled_tasks: enough_labelled,
        has_enough_labelled_tasks: currently_labelled >= enough_labelled,
    }
}

/// Filter the task set once, then compute each requested metric over it
pub fn compute_metrics(query: &MetricsQuery) -> TasksMetrics {
    let filtered = query.filter.apply(query.tasks);
    tracing::debug!(
        total = query.tasks.len(),
        filtered = filtered.len(),
        metrics = query.metrics.len(),
        "computing aggregated metrics"
    );

    let mut out = TasksMetrics::default();
    for metric in query.metrics {
        match metric {
            MetricName::TotalNbTasks => out.total_nb_tasks = Some(total_nb_tasks(&filtered)),
            MetricName::GlobalSuccessRate => {
                out.global_success_rate = global_success_rate(&filtered)
            }
            MetricName::MostDetectedEvent => {
                out.most_detected_event = most_detected_event(&filtered)
            }
            MetricName::NbDailyTasks => out.nb_daily_tasks = Some(nb_daily_tasks(&filtered)),
            MetricName::DailySuccessRate => {
                out.daily_success_rate = Some(daily_success_rate(&filtered))
            }
            MetricName::EventsRanking => {
                out.events_ranking = Some(events_ranking(&filtered, query.config.ranking_window_days))
            }
            MetricName::SuccessRatePerTaskPosition => {
                out.success_rate_per_task_position =
                    success_rate_per_task_position(&filtered, query.sessions)
            }
        }
    }
    out
}

fn success_rate<'a>(tasks: impl Iterator<Item = &'a Task>) -> Option<f64> {
    let mut successes = 0usize;
    let mut labelled = 0usize;
    for task in tasks {
        if task.flag.is_labelled() {
            labelled += 1;
            if task.flag == Flag::Success {
                successes += 1;
            }
        }
    }
    if labelled == 0 {
        None
    } else {
        Some(successes as f64 / labelled as f64)
    }
}

fn count_events<'a>(tasks: impl Iterator<Item = &'a Task>) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for task in tasks {
        for event in &task.events {
            *counts.entry(event.event_name.clone()).or_insert(0) += 1;
        }
    }
    counts
}

fn rank_events(counts: HashMap<String, usize>) -> Vec<EventCount> {
    let mut ranked: Vec<EventCount> = counts
        .into_iter()
        .map(|(event_name, nb_events)| EventCount {
            event_name,
            nb_events,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.nb_events
            .cmp(&a.nb_events)
            .then_with(|| a.event_name.cmp(&b.event_name))
    });
    ranked
}

fn day_buckets(tasks: &[Task]) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(timestamp) = task.created_at_utc() {
            buckets.entry(timestamp.date_naive()).or_default().push(task);
        }
    }
    buckets
}

fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}
