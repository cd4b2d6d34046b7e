//! Error types for vigil-audit

use thiserror::Error;

/// Audit chain errors
#[derive(Error, Debug)]
pub enum AuditError {
    /// Hash-chain verification failed. Never recovered internally.
    #[error("Audit integrity fault at seq {first_bad_seq}: {detail}")]
    IntegrityFault { first_bad_seq: u64, detail: String },

    #[error("Audit store format error: {0}")]
    StoreFormat(String),

    #[error("Unsupported audit store version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The boundary guard refused the chain at construction.
    #[error(transparent)]
    Boundary(#[from] vigil_boundary::BoundaryError),
}

/// Result type alias for vigil-audit
pub type Result<T> = std::result::Result<T, AuditError>;
