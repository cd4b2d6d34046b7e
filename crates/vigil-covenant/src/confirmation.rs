//! Human decision recording
//!
//! Records what the human decided and nothing else. Reasons are stored
//! verbatim; rejection is always allowed.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::types::{PatchRecord, HUMAN_ACTOR};

/// Record a human confirmation of a patch.
pub fn record_confirmation(
    patch_id: Uuid,
    timestamp: DateTime<Utc>,
    reason: impl Into<String>,
    patch_hash: impl Into<String>,
    patch_diff: impl Into<String>,
    symbols_modified: Vec<String>,
) -> PatchRecord {
    info!(%patch_id, "human confirmed patch");
    PatchRecord {
        patch_id,
        timestamp,
        patch_hash: patch_hash.into(),
        patch_diff: patch_diff.into(),
        symbols_modified,
        human_confirmed: true,
        human_rejected: false,
        human_reason: reason.into(),
        human_initiated: true,
        actor: HUMAN_ACTOR.to_string(),
    }
}

/// Record a human rejection of a patch. Always allowed.
pub fn record_rejection(
    patch_id: Uuid,
    timestamp: DateTime<Utc>,
    reason: impl Into<String>,
    patch_hash: impl Into<String>,
    patch_diff: impl Into<String>,
    symbols_modified: Vec<String>,
) -> PatchRecord {
    info!(%patch_id, "human rejected patch");
    PatchRecord {
        patch_id,
        timestamp,
        patch_hash: patch_hash.into(),
        patch_diff: patch_diff.into(),
        symbols_modified,
        human_confirmed: false,
        human_rejected: true,
        human_reason: reason.into(),
        human_initiated: true,
        actor: HUMAN_ACTOR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_is_human_attributed() {
        let record = record_confirmation(
            Uuid::new_v4(),
            Utc::now(),
            "reviewed the diff",
            "abc",
            "diff",
            vec!["issue_confirmation".to_string()],
        );
        assert!(record.human_confirmed);
        assert!(!record.human_rejected);
        assert!(record.human_initiated);
        assert_eq!(record.actor, HUMAN_ACTOR);
    }

    #[test]
    fn test_rejection_is_recorded_verbatim() {
        let record = record_rejection(
            Uuid::new_v4(),
            Utc::now(),
            "  touches the transmit path  ",
            "abc",
            "diff",
            Vec::new(),
        );
        assert!(record.human_rejected);
        assert!(!record.human_confirmed);
        // Reason is stored as provided, not normalized.
        assert_eq!(record.human_reason, "  touches the transmit path  ");
    }
}
