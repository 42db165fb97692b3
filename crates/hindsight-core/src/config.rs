//! Aggregation configuration

/// Tunables for the metrics engine
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// How many human-labelled tasks a project needs before automatic
    /// evaluation is considered trustworthy
    pub enough_labelled_tasks: usize,

    /// Trailing window for the events ranking, in days
    pub ranking_window_days: i64,
}

impl CoreConfig {
    pub fn new() -> Self {
        Self {
            enough_labelled_tasks: 10,
            ranking_window_days: 7,
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CoreConfig::new();
        assert_eq!(config.enough_labelled_tasks, 10);
        assert_eq!(config.ranking_window_days, 7);
    }
}
