//! Confirmation-gated patch application
//!
//! The single write path for code changes. Refuses without a confirmed,
//! non-rejected human decision record.

use chrono::Utc;
use tracing::info;

use crate::error::{CovenantError, Result};
use crate::hashing::{decision_hash, patch_hash};
use crate::types::{ApplyResult, PatchRecord, HUMAN_ACTOR};

/// Apply a patch under a human confirmation.
///
/// The confirmation must be a confirmed, non-rejected record; anything
/// else is refused with a typed error. The result carries the applied
/// patch hash and the hash of the decision that authorized it.
pub fn apply_patch(patch_content: &str, confirmation: &PatchRecord) -> Result<ApplyResult> {
    if confirmation.human_rejected {
        return Err(CovenantError::PatchRejected {
            patch_id: confirmation.patch_id.to_string(),
        });
    }
    if !confirmation.human_confirmed {
        return Err(CovenantError::ConfirmationRequired {
            patch_id: confirmation.patch_id.to_string(),
        });
    }

    let applied_hash = patch_hash(patch_content);
    let confirmation_hash = decision_hash(
        confirmation.patch_id,
        confirmation.human_confirmed,
        confirmation.human_rejected,
        &confirmation.human_reason,
        confirmation.timestamp,
    );

    info!(patch_id = %confirmation.patch_id, "patch applied under human confirmation");
    Ok(ApplyResult {
        applied: true,
        patch_hash: applied_hash,
        confirmation_hash,
        timestamp: Utc::now(),
        human_initiated: true,
        actor: HUMAN_ACTOR.to_string(),
    })
}
