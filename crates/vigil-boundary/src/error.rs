//! Error types for vigil-boundary

use thiserror::Error;

/// Boundary enforcement errors
///
/// Every variant is a hard stop. Core components never catch these;
/// they surface to the embedding application as fatal.
#[derive(Error, Debug)]
pub enum BoundaryError {
    #[error("Architectural violation in `{component}`: {detail}")]
    ArchitecturalViolation { component: String, detail: String },

    #[error("Read-only violation: `{component}` declared a write target in phase {phase}")]
    ReadOnlyViolation { component: String, phase: u8 },

    #[error("Capability `{required}` missing for operation `{operation}`")]
    CapabilityMissing { required: String, operation: String },
}

/// Result type alias for vigil-boundary
pub type Result<T> = std::result::Result<T, BoundaryError>;
