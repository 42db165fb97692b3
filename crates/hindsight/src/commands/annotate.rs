use std::sync::Arc;

use anyhow::Context;
use hindsight_annotate::{Annotator, MutationOutcome};
use hindsight_client::StoreClient;
use hindsight_model::Flag;

use crate::cli::StoreArgs;
use crate::commands::{parse_flag, runtime};

enum Action<'a> {
    Add(&'a str),
    Remove(&'a str),
    Confirm(&'a str),
    SetFlag(Flag),
}

pub fn run_add_event(store: &StoreArgs, task_id: &str, event_name: &str) -> anyhow::Result<()> {
    execute(store, task_id, Action::Add(event_name))
}

pub fn run_remove_event(store: &StoreArgs, task_id: &str, event_name: &str) -> anyhow::Result<()> {
    execute(store, task_id, Action::Remove(event_name))
}

pub fn run_confirm_event(store: &StoreArgs, task_id: &str, event_name: &str) -> anyhow::Result<()> {
    execute(store, task_id, Action::Confirm(event_name))
}

pub fn run_set_flag(store: &StoreArgs, task_id: &str, flag: &str) -> anyhow::Result<()> {
    let flag = parse_flag(flag)?;
    execute(store, task_id, Action::SetFlag(flag))
}

fn execute(store: &StoreArgs, task_id: &str, action: Action) -> anyhow::Result<()> {
    let rt = runtime()?;
    rt.block_on(async {
        let client = Arc::new(StoreClient::new(&store.api_url, &store.api_key));
        let project = client.fetch_project(&store.project).await?;
        let tasks = client.fetch_tasks(&store.project).await?;
        let task = tasks
            .into_iter()
            .find(|t| t.id == task_id)
            .with_context(|| format!("task {task_id} not found in project {}", store.project))?;

        let annotator = Annotator::new(client);
        annotator.track(task);

        let outcome = match action {
            Action::Add(name) => annotator.add_event(&project, task_id, name).await?,
            Action::Remove(name) => annotator.remove_event(task_id, name).await?,
            Action::Confirm(name) => annotator.confirm_event(task_id, name).await?,
            Action::SetFlag(flag) => annotator.set_flag(task_id, flag).await?,
        };

        match outcome {
            MutationOutcome::Committed(task) => {
                println!("{}", serde_json::to_string_pretty(&task)?);
            }
            MutationOutcome::NoOp => println!("no change"),
        }
        Ok(())
    })
}
