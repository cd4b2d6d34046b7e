//! The admitted covenant component
//!
//! Front door for the covenant operations: recording decisions,
//! binding patches, validating symbols, and applying under
//! confirmation. Construction presents a manifest to the boundary
//! guard; the underlying operations stay the pure functions the rest
//! of the crate defines.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use vigil_boundary::{BoundaryGuard, ComponentManifest};

use crate::applicator;
use crate::binding;
use crate::confirmation;
use crate::error::Result;
use crate::symbols::{self, validate_symbols};
use crate::types::{ApplyResult, PatchBinding, PatchRecord, SymbolConstraints, SymbolValidation};

/// Guard-admitted façade over the covenant operations.
pub struct PatchCovenant {
    constraints: SymbolConstraints,
}

impl PatchCovenant {
    /// Construct the covenant, presenting its manifest to the guard.
    pub fn new(guard: &BoundaryGuard, constraints: SymbolConstraints) -> Result<Self> {
        let manifest = ComponentManifest::new("patch_covenant")
            .with_method("record_confirmation")
            .with_method("record_rejection")
            .with_method("create_binding")
            .with_method("verify_binding")
            .with_method("validate_symbols")
            .with_method("apply_patch");
        guard.admit(&manifest)?;
        Ok(PatchCovenant { constraints })
    }

    /// Covenant over the built-in constraint set.
    pub fn with_default_constraints(guard: &BoundaryGuard) -> Result<Self> {
        Self::new(guard, symbols::default_constraints())
    }

    /// The constraint set this covenant judges against.
    pub fn constraints(&self) -> &SymbolConstraints {
        &self.constraints
    }

    /// Record a human confirmation of a patch.
    pub fn record_confirmation(
        &self,
        patch_id: Uuid,
        timestamp: DateTime<Utc>,
        reason: impl Into<String>,
        patch_hash: impl Into<String>,
        patch_diff: impl Into<String>,
        symbols_modified: Vec<String>,
    ) -> PatchRecord {
        confirmation::record_confirmation(
            patch_id,
            timestamp,
            reason,
            patch_hash,
            patch_diff,
            symbols_modified,
        )
    }

    /// Record a human rejection of a patch. Always allowed.
    pub fn record_rejection(
        &self,
        patch_id: Uuid,
        timestamp: DateTime<Utc>,
        reason: impl Into<String>,
        patch_hash: impl Into<String>,
        patch_diff: impl Into<String>,
        symbols_modified: Vec<String>,
    ) -> PatchRecord {
        confirmation::record_rejection(
            patch_id,
            timestamp,
            reason,
            patch_hash,
            patch_diff,
            symbols_modified,
        )
    }

    /// Create the tamper-evident patch/decision binding.
    pub fn create_binding(
        &self,
        patch_hash: impl Into<String>,
        decision_hash: impl Into<String>,
        timestamp: DateTime<Utc>,
        session_id: Uuid,
    ) -> PatchBinding {
        binding::create_binding(patch_hash, decision_hash, timestamp, session_id)
    }

    /// Verify a binding by recomputation.
    pub fn verify_binding(&self, binding: &PatchBinding) -> bool {
        binding::verify_binding(binding)
    }

    /// Validate modified symbols against this covenant's constraints.
    pub fn validate_symbols(&self, symbols: &[String]) -> SymbolValidation {
        validate_symbols(symbols, &self.constraints)
    }

    /// Apply a patch under a human confirmation. The only write path.
    pub fn apply_patch(
        &self,
        patch_content: &str,
        confirmation: &PatchRecord,
    ) -> Result<ApplyResult> {
        applicator::apply_patch(patch_content, confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::patch_hash;

    fn covenant() -> PatchCovenant {
        PatchCovenant::with_default_constraints(&BoundaryGuard::default()).unwrap()
    }

    #[test]
    fn test_admitted_covenant_round_trip() {
        let covenant = covenant();
        let patch_id = Uuid::new_v4();
        let record = covenant.record_confirmation(
            patch_id,
            Utc::now(),
            "reviewed",
            patch_hash("content"),
            "diff",
            Vec::new(),
        );
        let result = covenant.apply_patch("content", &record).unwrap();
        assert!(result.applied);
        assert_eq!(result.patch_hash, patch_hash("content"));
    }

    #[test]
    fn test_rejection_blocks_apply() {
        let covenant = covenant();
        let record = covenant.record_rejection(
            Uuid::new_v4(),
            Utc::now(),
            "not this one",
            patch_hash("content"),
            "diff",
            Vec::new(),
        );
        assert!(covenant.apply_patch("content", &record).is_err());
    }

    #[test]
    fn test_binding_verifies_through_component() {
        let covenant = covenant();
        let binding = covenant.create_binding("p", "d", Utc::now(), Uuid::new_v4());
        assert!(covenant.verify_binding(&binding));
    }

    #[test]
    fn test_symbols_judged_by_held_constraints() {
        let covenant = covenant();
        let validation = covenant.validate_symbols(&["eval".to_string()]);
        assert!(!validation.passed);
        assert_eq!(
            validation.constraint_version,
            covenant.constraints().version
        );
    }
}
