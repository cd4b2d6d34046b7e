//! Assistant configuration

use serde::{Deserialize, Serialize};

/// Configuration for the browser assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistConfig {
    /// Similarity threshold for duplicate hints, in [0, 1].
    pub duplicate_threshold: f64,
    /// Maximum stored observations before FIFO eviction.
    pub max_observations: usize,
}

impl Default for AssistConfig {
    fn default() -> Self {
        AssistConfig {
            duplicate_threshold: 0.7,
            max_observations: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AssistConfig::default();
        assert_eq!(config.duplicate_threshold, 0.7);
        assert_eq!(config.max_observations, 10_000);
    }
}
