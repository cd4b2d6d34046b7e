//! Error types for vigil-submit
//!
//! Every refusal carries the offending identifiers so callers can log
//! and surface them without string parsing. State is consistent when
//! any of these is returned.

use thiserror::Error;
use uuid::Uuid;

use crate::draft::Platform;

/// Submission workflow errors
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The confirmation was already consumed. Exactly one consume ever
    /// succeeds.
    #[error("Confirmation {confirmation_id} has already been used")]
    TokenAlreadyUsed { confirmation_id: Uuid },

    /// The confirmation's validity window has passed.
    #[error("Confirmation {confirmation_id} expired at {expired_at}")]
    TokenExpired {
        confirmation_id: Uuid,
        expired_at: chrono::DateTime<chrono::Utc>,
    },

    /// The registry never issued this confirmation.
    #[error("Confirmation {confirmation_id} was not issued by this registry")]
    UnknownConfirmation { confirmation_id: Uuid },

    /// A human-confirmation token failed format validation.
    #[error("Human token rejected: {detail}")]
    TokenFormat { detail: String },

    /// The draft's hash no longer matches the confirmed hash.
    /// Hard stop: the network is never enabled on this path.
    #[error(
        "Report tampering detected for confirmation {confirmation_id}: \
         expected {expected_hash}, actual {actual_hash}"
    )]
    ReportTampering {
        confirmation_id: Uuid,
        expected_hash: String,
        actual_hash: String,
    },

    /// A submission for this (decision, platform) pair already exists
    /// or is in flight.
    #[error("Duplicate submission for decision {decision_id} on {platform}")]
    DuplicateSubmission {
        decision_id: String,
        platform: Platform,
    },

    /// An adapter attempted more than one outbound request in a single
    /// submit. Hard stop at the adapter layer.
    #[error(
        "adapter_multiple_requests: adapter attempted {request_count} requests; \
         maximum allowed is 1"
    )]
    AdapterViolation { request_count: u32 },

    /// The platform call itself failed. Local failure: the confirmation
    /// stays consumed and the caller decides whether to mint a new one.
    #[error("Platform {platform} submission failed: {detail}")]
    PlatformFailure { platform: Platform, detail: String },

    /// A workflow transition outside the legal table.
    #[error("Invalid workflow transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// The boundary guard refused a component at construction.
    #[error(transparent)]
    Boundary(#[from] vigil_boundary::BoundaryError),
}

/// Result type alias for vigil-submit
pub type Result<T> = std::result::Result<T, SubmitError>;
