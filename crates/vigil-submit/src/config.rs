//! Submission configuration

use serde::{Deserialize, Serialize};

/// Configuration for the submission path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Confirmation validity window in seconds.
    pub confirmation_ttl_seconds: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        SubmissionConfig {
            confirmation_ttl_seconds: 900,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_fifteen_minutes() {
        assert_eq!(SubmissionConfig::default().confirmation_ttl_seconds, 900);
    }
}
