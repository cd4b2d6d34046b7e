//! Error types for vigil-truth

use thiserror::Error;

/// Truth-Engine client errors
#[derive(Error, Debug)]
pub enum TruthError {
    /// The Truth Engine is unreachable. Hard stop: no classification
    /// means no decisions anywhere downstream.
    #[error("Truth Engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine answered with something other than its contract
    /// allows. Never defaulted to OK.
    #[error("Truth Engine protocol violation: {0}")]
    ProtocolViolation(String),

    /// The core attempted a responsibility that belongs to the engine.
    #[error("Architectural violation: attempted to {attempted}. {remedy}")]
    ArchitecturalViolation { attempted: String, remedy: String },

    /// An observation was acted on before its classification returned.
    #[error("Observation {0} has no classification yet")]
    PendingClassification(String),
}

/// Result type alias for vigil-truth
pub type Result<T> = std::result::Result<T, TruthError>;
