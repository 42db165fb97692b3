pub mod annotate;
pub mod metrics;
pub mod tasks;
pub mod version;

use anyhow::bail;
use hindsight_core::TaskFilter;
use hindsight_model::Flag;

use crate::cli::FilterArgs;

/// Parse a CLI flag word into the tri-state verdict
pub fn parse_flag(value: &str) -> anyhow::Result<Flag> {
    match value {
        "success" => Ok(Flag::Success),
        "failure" => Ok(Flag::Failure),
        "unset" => Ok(Flag::Unset),
        other => bail!("invalid flag {other:?}, expected success|failure|unset"),
    }
}

/// Build the canonical filter from CLI arguments
pub fn build_filter(args: &FilterArgs) -> anyhow::Result<TaskFilter> {
    Ok(TaskFilter {
        flag: args.flag.as_deref().map(parse_flag).transpose()?,
        event_name: args.event.clone(),
    })
}

/// Current-thread runtime for commands that talk to the store
pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("success").unwrap(), Flag::Success);
        assert_eq!(parse_flag("failure").unwrap(), Flag::Failure);
        assert_eq!(parse_flag("unset").unwrap(), Flag::Unset);
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_build_filter_identity_when_empty() {
        let filter = build_filter(&FilterArgs {
            flag: None,
            event: None,
        })
        .unwrap();
        assert!(filter.is_identity());
    }
}
