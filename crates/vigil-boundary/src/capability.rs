//! Capability tokens for guarded operations
//!
//! A guarded operation requires a token minted by the guard for exactly
//! that capability. Tokens cannot be constructed outside this crate.

use serde::{Deserialize, Serialize};

/// The narrow set of operations the core is permitted to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Append a typed event to the audit chain.
    AppendAudit,
    /// Submit an observation to the Truth Engine.
    SubmitObservation,
    /// Issue a submission confirmation to a human.
    IssueConfirmation,
    /// Consume a submission confirmation (single use).
    ConsumeConfirmation,
    /// Acquire a (decision, platform) submission key.
    AcquireSubmissionKey,
    /// Perform the single gated network transmission.
    TransmitReport,
    /// Emit an assistive output for human review.
    EmitAssistiveOutput,
    /// Apply a human-confirmed patch.
    ApplyPatch,
}

impl Capability {
    /// Stable name used in error messages and audit payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::AppendAudit => "append_audit",
            Capability::SubmitObservation => "submit_observation",
            Capability::IssueConfirmation => "issue_confirmation",
            Capability::ConsumeConfirmation => "consume_confirmation",
            Capability::AcquireSubmissionKey => "acquire_submission_key",
            Capability::TransmitReport => "transmit_report",
            Capability::EmitAssistiveOutput => "emit_assistive_output",
            Capability::ApplyPatch => "apply_patch",
        }
    }
}

/// Proof that the guard granted one capability to one component.
///
/// The constructor is crate-private; the only mint is
/// [`BoundaryGuard::grant`](crate::guard::BoundaryGuard::grant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityToken {
    capability: Capability,
    component: String,
}

impl CapabilityToken {
    pub(crate) fn mint(capability: Capability, component: &str) -> Self {
        CapabilityToken {
            capability,
            component: component.to_string(),
        }
    }

    /// The capability this token carries.
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// The component the token was granted to.
    pub fn component(&self) -> &str {
        &self.component
    }
}
