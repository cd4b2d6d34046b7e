//! Audit configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for chain persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Absolute path of the append-only chain file.
    pub log_path: PathBuf,
}

impl AuditConfig {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        AuditConfig {
            log_path: log_path.into(),
        }
    }
}
