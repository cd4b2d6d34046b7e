//! Covenant audit mirror
//!
//! Mirrors every patch decision, binding, validation, and application
//! into the shared audit chain. Append-only by construction; the
//! covenant holds an append handle and nothing else.

use std::sync::Arc;
use tracing::debug;

use vigil_audit::{AuditChain, AuditEntry, EventKind, Payload};
use vigil_boundary::{BoundaryGuard, ComponentManifest};

use crate::error::Result;
use crate::types::{ApplyResult, PatchBinding, PatchRecord, SymbolValidation};

/// Appends covenant events to the audit chain.
pub struct CovenantLog {
    chain: Arc<AuditChain>,
}

impl CovenantLog {
    /// Construct the log, presenting its manifest to the guard.
    pub fn new(guard: &BoundaryGuard, chain: Arc<AuditChain>) -> Result<Self> {
        let manifest = ComponentManifest::new("covenant_log")
            .with_method("log_record")
            .with_method("log_binding")
            .with_method("log_validation")
            .with_method("log_apply");
        guard.admit(&manifest)?;
        Ok(CovenantLog { chain })
    }

    /// Record a human decision over a patch.
    pub fn log_record(&self, record: &PatchRecord) -> AuditEntry {
        let kind = if record.human_rejected {
            EventKind::PatchRejected
        } else {
            EventKind::PatchConfirmed
        };
        debug!(patch_id = %record.patch_id, ?kind, "covenant decision logged");
        self.chain.append(
            kind,
            &record.actor,
            Payload::new()
                .with("patch_id", record.patch_id.to_string())
                .with("patch_hash", record.patch_hash.clone())
                .with("reason", record.human_reason.clone()),
        )
    }

    /// Record a patch/decision binding.
    pub fn log_binding(&self, binding: &PatchBinding) -> AuditEntry {
        self.chain.append(
            EventKind::PatchBound,
            "covenant",
            Payload::new()
                .with("binding_hash", binding.binding_hash.clone())
                .with("patch_hash", binding.patch_hash.clone())
                .with("decision_hash", binding.decision_hash.clone())
                .with("session_id", binding.session_id.to_string()),
        )
    }

    /// Record a symbol validation outcome.
    ///
    /// Failures are recorded as boundary violations; the blocked
    /// symbols ride along in the payload.
    pub fn log_validation(&self, patch_id: &str, validation: &SymbolValidation) -> AuditEntry {
        if validation.passed {
            self.chain.append(
                EventKind::PatchConfirmed,
                "covenant",
                Payload::new()
                    .with("patch_id", patch_id)
                    .with("validation", "passed")
                    .with("constraint_version", validation.constraint_version.clone()),
            )
        } else {
            self.chain.append(
                EventKind::BoundaryViolation,
                "covenant",
                Payload::new()
                    .with("patch_id", patch_id)
                    .with("validation", "failed")
                    .with("blocked_symbols", validation.blocked_symbols.join(","))
                    .with("constraint_version", validation.constraint_version.clone()),
            )
        }
    }

    /// Record a confirmed application.
    pub fn log_apply(&self, result: &ApplyResult) -> AuditEntry {
        self.chain.append(
            EventKind::PatchApplied,
            &result.actor,
            Payload::new()
                .with("patch_hash", result.patch_hash.clone())
                .with("confirmation_hash", result.confirmation_hash.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applicator::apply_patch;
    use crate::binding::create_binding;
    use crate::confirmation::{record_confirmation, record_rejection};
    use crate::hashing::patch_hash;
    use crate::symbols::{default_constraints, validate_symbols};
    use chrono::Utc;
    use uuid::Uuid;

    fn log() -> (Arc<AuditChain>, CovenantLog) {
        let guard = BoundaryGuard::default();
        let chain = Arc::new(AuditChain::new(&guard).unwrap());
        let log = CovenantLog::new(&guard, Arc::clone(&chain)).unwrap();
        (chain, log)
    }

    #[test]
    fn test_confirmation_and_rejection_kinds() {
        let (chain, log) = log();
        let confirmed = record_confirmation(
            Uuid::new_v4(),
            Utc::now(),
            "fine",
            "hash",
            "diff",
            Vec::new(),
        );
        let rejected = record_rejection(
            Uuid::new_v4(),
            Utc::now(),
            "not fine",
            "hash",
            "diff",
            Vec::new(),
        );
        log.log_record(&confirmed);
        log.log_record(&rejected);

        let kinds: Vec<EventKind> = chain.snapshot().iter().map(|e| e.event_kind).collect();
        assert_eq!(kinds, vec![EventKind::PatchConfirmed, EventKind::PatchRejected]);
        // Decisions carry human attribution into the chain.
        assert!(chain.snapshot().iter().all(|e| e.actor == "HUMAN"));
    }

    #[test]
    fn test_binding_logged_with_hashes() {
        let (chain, log) = log();
        let binding = create_binding("p-hash", "d-hash", Utc::now(), Uuid::new_v4());
        log.log_binding(&binding);

        let entries = chain.entries_of_kind(EventKind::PatchBound);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].payload.get("patch_hash"), Some("p-hash"));
        assert_eq!(
            entries[0].payload.get("binding_hash"),
            Some(binding.binding_hash.as_str())
        );
    }

    #[test]
    fn test_failed_validation_is_boundary_violation() {
        let (chain, log) = log();
        let validation = validate_symbols(&["eval".to_string()], &default_constraints());
        log.log_validation("patch-1", &validation);

        let entries = chain.entries_of_kind(EventKind::BoundaryViolation);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].payload.get("blocked_symbols"), Some("eval"));
    }

    #[test]
    fn test_apply_mirrored_and_chain_verifies() {
        let (chain, log) = log();
        let confirmation = record_confirmation(
            Uuid::new_v4(),
            Utc::now(),
            "ship it",
            patch_hash("content"),
            "diff",
            Vec::new(),
        );
        let result = apply_patch("content", &confirmation).unwrap();
        log.log_record(&confirmation);
        log.log_apply(&result);

        assert_eq!(chain.entries_of_kind(EventKind::PatchApplied).len(), 1);
        assert!(chain.verify().ok);
    }
}
