use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hindsight")]
#[command(version)]
#[command(about = "Annotation and metrics core for logged AI interactions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute dashboard metrics over a task export or the remote store
    Metrics {
        /// Path to a tasks JSONL export (local mode)
        #[arg(short, long)]
        file: Option<String>,

        #[command(flatten)]
        store: Option<StoreArgs>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Metrics to compute (all when omitted)
        #[arg(short, long)]
        metrics: Vec<String>,
    },

    /// List filtered tasks from a JSONL export
    Tasks {
        /// Path to a tasks JSONL export
        #[arg(short, long)]
        file: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Append the filtered records to another JSONL file
        #[arg(long)]
        export: Option<String>,
    },

    /// Edit tags and flags on a task through the store
    Annotate {
        #[command(flatten)]
        store: StoreArgs,

        #[command(subcommand)]
        action: AnnotateAction,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand)]
pub enum AnnotateAction {
    /// Tag a task with an event from the project vocabulary
    AddEvent { task_id: String, event_name: String },
    /// Remove an event tag from a task
    RemoveEvent { task_id: String, event_name: String },
    /// Mark a detected event as human-confirmed
    ConfirmEvent { task_id: String, event_name: String },
    /// Set the task verdict (success|failure|unset)
    SetFlag { task_id: String, flag: String },
}

/// Remote store coordinates; the credential is opaque to the core
#[derive(Args)]
pub struct StoreArgs {
    /// Base URL of the store API
    #[arg(long, required = false, requires_all = ["api_key", "project"])]
    pub api_url: String,

    /// Bearer credential for the store API
    #[arg(long, required = false)]
    pub api_key: String,

    /// Project identifier
    #[arg(long, required = false)]
    pub project: String,
}

/// Filter shared by table views and aggregation requests
#[derive(Args)]
pub struct FilterArgs {
    /// Keep only tasks with this flag (success|failure|unset)
    #[arg(long)]
    pub flag: Option<String>,

    /// Keep only tasks tagged with this event name
    #[arg(long)]
    pub event: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::try_parse_from(["hindsight", "version"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Version));
    }

    #[test]
    fn test_cli_parse_metrics_local() {
        let cli = Cli::try_parse_from([
            "hindsight", "metrics", "--file", "tasks.jsonl", "--flag", "success",
        ]);
        assert!(cli.is_ok());
        if let Commands::Metrics { file, filter, .. } = cli.unwrap().command {
            assert_eq!(file, Some("tasks.jsonl".to_string()));
            assert_eq!(filter.flag, Some("success".to_string()));
        } else {
            panic!("Expected Metrics command");
        }
    }

    #[test]
    fn test_cli_parse_metrics_remote() {
        let cli = Cli::try_parse_from([
            "hindsight",
            "metrics",
            "--api-url",
            "https://store.example.com",
            "--api-key",
            "secret",
            "--project",
            "proj_1",
            "--metrics",
            "total_nb_tasks",
        ]);
        assert!(cli.is_ok());
        if let Commands::Metrics { store, metrics, .. } = cli.unwrap().command {
            assert_eq!(store.unwrap().project, "proj_1");
            assert_eq!(metrics, vec!["total_nb_tasks".to_string()]);
        } else {
            panic!("Expected Metrics command");
        }
    }

    #[test]
    fn test_cli_parse_annotate_set_flag() {
        let cli = Cli::try_parse_from([
            "hindsight",
            "annotate",
            "--api-url",
            "https://store.example.com",
            "--api-key",
            "secret",
            "--project",
            "proj_1",
            "set-flag",
            "task_1",
            "failure",
        ]);
        assert!(cli.is_ok());
        if let Commands::Annotate { action, .. } = cli.unwrap().command {
            assert!(matches!(action, AnnotateAction::SetFlag { .. }));
        } else {
            panic!("Expected Annotate command");
        }
    }

    #[test]
    fn test_cli_parse_tasks_with_export() {
        let cli = Cli::try_parse_from([
            "hindsight", "tasks", "--file", "in.jsonl", "--event", "bug", "--export", "out.jsonl",
        ]);
        assert!(cli.is_ok());
        if let Commands::Tasks { filter, export, .. } = cli.unwrap().command {
            assert_eq!(filter.event, Some("bug".to_string()));
            assert_eq!(export, Some("out.jsonl".to_string()));
        } else {
            panic!("Expected Tasks command");
        }
    }
}
