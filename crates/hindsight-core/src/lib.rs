//! Filter engine and metrics aggregation for logged interactions

mod config;
mod filter;
mod metrics;

pub use config::CoreConfig;
pub use filter::TaskFilter;
pub use metrics::{
    compute_metrics, daily_success_rate, events_ranking, global_success_rate, labelling_progress,
    most_detected_event, nb_daily_tasks, success_rate_per_task_position, total_nb_tasks,
    DailySuccessRate, DailyTaskCount, EventCount, LabellingProgress, MetricName, MetricsQuery,
    PositionSuccessRate, TasksMetrics,
};
