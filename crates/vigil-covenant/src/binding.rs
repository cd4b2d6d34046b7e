//! Patch/decision binding
//!
//! A binding ties a specific patch to a specific decision at a specific
//! time. Verification recomputes and compares; true or false, nothing
//! in between.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::hashing::binding_hash;
use crate::types::PatchBinding;

/// Create the tamper-evident binding for a patch and its decision.
pub fn create_binding(
    patch_hash: impl Into<String>,
    decision_hash: impl Into<String>,
    timestamp: DateTime<Utc>,
    session_id: Uuid,
) -> PatchBinding {
    let patch_hash = patch_hash.into();
    let decision_hash = decision_hash.into();
    let hash = binding_hash(&patch_hash, &decision_hash, timestamp);
    PatchBinding {
        binding_hash: hash,
        patch_hash,
        decision_hash,
        timestamp,
        session_id,
    }
}

/// Verify a binding by recomputation.
pub fn verify_binding(binding: &PatchBinding) -> bool {
    let expected = binding_hash(
        &binding.patch_hash,
        &binding.decision_hash,
        binding.timestamp,
    );
    binding.binding_hash == expected
}
