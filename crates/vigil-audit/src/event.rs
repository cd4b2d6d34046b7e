//! Typed audit events

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every event kind the pipeline records.
///
/// The canonical string form (SCREAMING_SNAKE) is part of the persisted
/// format and of the hash input; variants are append-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    ConfirmationIssued,
    ConfirmationConsumed,
    NetworkAccessGranted,
    Transmitted,
    TransmissionFailed,
    DuplicateBlocked,
    ReportTamperingDetected,
    ChainTamperingDetected,
    WorkflowCreated,
    WorkflowTransition,
    ExplorationStarted,
    ExplorationStopped,
    ObservationSubmitted,
    ClassificationReceived,
    StopLossTriggered,
    BoundaryViolation,
    PatchConfirmed,
    PatchRejected,
    PatchBound,
    PatchApplied,
}

impl EventKind {
    /// Canonical string form used in hashes and persisted records.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ConfirmationIssued => "CONFIRMATION_ISSUED",
            EventKind::ConfirmationConsumed => "CONFIRMATION_CONSUMED",
            EventKind::NetworkAccessGranted => "NETWORK_ACCESS_GRANTED",
            EventKind::Transmitted => "TRANSMITTED",
            EventKind::TransmissionFailed => "TRANSMISSION_FAILED",
            EventKind::DuplicateBlocked => "DUPLICATE_BLOCKED",
            EventKind::ReportTamperingDetected => "REPORT_TAMPERING_DETECTED",
            EventKind::ChainTamperingDetected => "CHAIN_TAMPERING_DETECTED",
            EventKind::WorkflowCreated => "WORKFLOW_CREATED",
            EventKind::WorkflowTransition => "WORKFLOW_TRANSITION",
            EventKind::ExplorationStarted => "EXPLORATION_STARTED",
            EventKind::ExplorationStopped => "EXPLORATION_STOPPED",
            EventKind::ObservationSubmitted => "OBSERVATION_SUBMITTED",
            EventKind::ClassificationReceived => "CLASSIFICATION_RECEIVED",
            EventKind::StopLossTriggered => "STOP_LOSS_TRIGGERED",
            EventKind::BoundaryViolation => "BOUNDARY_VIOLATION",
            EventKind::PatchConfirmed => "PATCH_CONFIRMED",
            EventKind::PatchRejected => "PATCH_REJECTED",
            EventKind::PatchBound => "PATCH_BOUND",
            EventKind::PatchApplied => "PATCH_APPLIED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form_matches_serde() {
        let json = serde_json::to_string(&EventKind::NetworkAccessGranted).unwrap();
        assert_eq!(json, "\"NETWORK_ACCESS_GRANTED\"");
        assert_eq!(
            EventKind::NetworkAccessGranted.as_str(),
            "NETWORK_ACCESS_GRANTED"
        );
    }

    #[test]
    fn test_round_trip() {
        let kind: EventKind = serde_json::from_str("\"DUPLICATE_BLOCKED\"").unwrap();
        assert_eq!(kind, EventKind::DuplicateBlocked);
    }
}
