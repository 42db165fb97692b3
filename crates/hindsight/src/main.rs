mod cli;
mod commands;

use clap::Parser;
use cli::{AnnotateAction, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Metrics {
            file,
            store,
            filter,
            metrics,
        } => commands::metrics::run(file.as_deref(), store.as_ref(), &filter, &metrics),
        Commands::Tasks {
            file,
            filter,
            export,
        } => commands::tasks::run(&file, &filter, export.as_deref()),
        Commands::Annotate { store, action } => match action {
            AnnotateAction::AddEvent {
                task_id,
                event_name,
            } => commands::annotate::run_add_event(&store, &task_id, &event_name),
            AnnotateAction::RemoveEvent {
                task_id,
                event_name,
            } => commands::annotate::run_remove_event(&store, &task_id, &event_name),
            AnnotateAction::ConfirmEvent {
                task_id,
                event_name,
            } => commands::annotate::run_confirm_event(&store, &task_id, &event_name),
            AnnotateAction::SetFlag { task_id, flag } => {
                commands::annotate::run_set_flag(&store, &task_id, &flag)
            }
        },
        Commands::Version => commands::version::run(),
    }
}
