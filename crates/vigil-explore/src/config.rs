//! Exploration configuration

use serde::{Deserialize, Serialize};

use crate::budget::ExplorationBudget;

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Worker pool size.
    pub workers: usize,
    /// Worker floor under rate pressure.
    pub rate_limit_floor: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        ParallelConfig {
            workers: 4,
            rate_limit_floor: 1,
        }
    }
}

/// Complete exploration configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplorationConfig {
    #[serde(default)]
    pub budget: ExplorationBudget,
    #[serde(default)]
    pub parallel: ParallelConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExplorationConfig::default();
        assert_eq!(config.parallel.workers, 4);
        assert_eq!(config.parallel.rate_limit_floor, 1);
        assert_eq!(config.budget.max_actions, 1000);
        assert_eq!(config.budget.max_time_seconds, 3600);
    }

    #[test]
    fn test_deserializes_with_partial_input() {
        let config: ExplorationConfig =
            serde_json::from_str(r#"{ "parallel": { "workers": 8, "rate_limit_floor": 2 } }"#)
                .unwrap();
        assert_eq!(config.parallel.workers, 8);
        assert_eq!(config.budget.max_breadth, 100);
    }
}
