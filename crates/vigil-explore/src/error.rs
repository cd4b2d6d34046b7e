//! Error types for vigil-explore

use thiserror::Error;
use uuid::Uuid;

use vigil_truth::TruthError;

/// Exploration errors
#[derive(Error, Debug)]
pub enum ExploreError {
    /// Truth-Engine failure. Unavailability inside this variant is the
    /// hard stop that terminates exploration.
    #[error(transparent)]
    Truth(#[from] TruthError),

    /// A budget dimension is exhausted. Exploration stops gracefully.
    #[error("Exploration budget exhausted: {resource}")]
    BudgetExhausted { resource: String },

    /// A tool failed while testing one hypothesis. Recoverable: the
    /// hypothesis is marked failed and exploration continues.
    #[error("Tool failure while testing {hypothesis_id}: {detail}")]
    ToolFailure { hypothesis_id: Uuid, detail: String },

    /// The Truth Engine placed the target out of scope.
    #[error("Target `{target}` refused by scope validation: {reason}")]
    ScopeRefused { target: String, reason: String },

    /// The boundary guard refused a component at construction.
    #[error(transparent)]
    Boundary(#[from] vigil_boundary::BoundaryError),
}

impl ExploreError {
    /// Whether this error must terminate exploration immediately.
    pub fn is_hard_stop(&self) -> bool {
        matches!(
            self,
            ExploreError::Truth(TruthError::EngineUnavailable(_))
                | ExploreError::Truth(TruthError::ArchitecturalViolation { .. })
                | ExploreError::Boundary(_)
        )
    }
}

/// Result type alias for vigil-explore
pub type Result<T> = std::result::Result<T, ExploreError>;
