//! Covenant data model
//!
//! All records are frozen after construction. Decision attribution is
//! structural: `actor` is always `"HUMAN"` and `human_initiated` is
//! always true, because no other construction path exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Actor value carried by every covenant record.
pub const HUMAN_ACTOR: &str = "HUMAN";

/// Frozen record of a patch and the human decision over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRecord {
    /// Patch identifier.
    pub patch_id: Uuid,
    /// When the record was created.
    pub timestamp: DateTime<Utc>,
    /// SHA-256 of the patch content.
    pub patch_hash: String,
    /// Human-readable diff. Stored, never analyzed.
    pub patch_diff: String,
    /// Symbols the patch touches.
    pub symbols_modified: Vec<String>,
    /// True when the human confirmed the patch.
    pub human_confirmed: bool,
    /// True when the human rejected the patch.
    pub human_rejected: bool,
    /// Free-form reason. Stored verbatim, never analyzed.
    pub human_reason: String,
    /// Always true; decisions only exist because a human made one.
    pub human_initiated: bool,
    /// Always `"HUMAN"`.
    pub actor: String,
}

/// Cryptographic triple tying a patch to a decision at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchBinding {
    /// SHA-256 over (patch hash, decision hash, timestamp).
    pub binding_hash: String,
    /// SHA-256 of the patch content.
    pub patch_hash: String,
    /// SHA-256 of the decision record.
    pub decision_hash: String,
    /// When the binding was created.
    pub timestamp: DateTime<Utc>,
    /// Session the binding belongs to.
    pub session_id: Uuid,
}

/// Static symbol constraints, versioned and immutable at runtime.
///
/// The denylist takes precedence over the allowlist. An empty allowlist
/// means "no symbol is pre-approved", not "everything is allowed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolConstraints {
    /// Symbols a patch may modify.
    pub allowlist: BTreeSet<String>,
    /// Symbols that must never appear. Takes precedence.
    pub denylist: BTreeSet<String>,
    /// Constraint set version.
    pub version: String,
}

/// Pass/fail outcome of symbol validation. No scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolValidation {
    pub passed: bool,
    /// Symbols that caused the failure, in input order.
    pub blocked_symbols: Vec<String>,
    /// Version of the constraint set that judged them.
    pub constraint_version: String,
}

/// Outcome of a confirmation-gated apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub applied: bool,
    /// SHA-256 of the applied patch content.
    pub patch_hash: String,
    /// SHA-256 of the confirmation that authorized it.
    pub confirmation_hash: String,
    pub timestamp: DateTime<Utc>,
    /// Always true.
    pub human_initiated: bool,
    /// Always `"HUMAN"`.
    pub actor: String,
}
