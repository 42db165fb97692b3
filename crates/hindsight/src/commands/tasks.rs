use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use hindsight_model::{append_jsonl, distinct_event_names, read_jsonl, Task};

use crate::cli::FilterArgs;
use crate::commands::build_filter;

pub fn run(file: &str, filter_args: &FilterArgs, export: Option<&str>) -> anyhow::Result<()> {
    let filter = build_filter(filter_args)?;
    let tasks: Vec<Task> =
        read_jsonl(Path::new(file)).with_context(|| format!("reading task export {file}"))?;
    let kept = filter.apply(&tasks);

    for task in &kept {
        let when = task
            .created_at_utc()
            .map(|d: DateTime<Utc>| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| task.created_at.to_string());
        let events: Vec<&str> = task.events.iter().map(|e| e.event_name.as_str()).collect();
        let preview: String = task.input.chars().take(60).collect();
        println!(
            "{}  {}  {:8}  [{}]  {}",
            task.id,
            when,
            task.flag.as_str(),
            events.join(","),
            preview
        );
    }
    println!("{} of {} tasks", kept.len(), tasks.len());

    let names = distinct_event_names(&kept);
    if !names.is_empty() {
        println!("events: {}", names.join(", "));
    }

    if let Some(export_path) = export {
        for task in &kept {
            append_jsonl(Path::new(export_path), task)?;
        }
        println!("exported {} tasks to {}", kept.len(), export_path);
    }
    Ok(())
}
