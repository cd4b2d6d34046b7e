//! Duplicate submission prevention
//!
//! Uniqueness of (decision, platform) is enforced twice over: a live
//! set covering in-flight transmissions, and the audit chain's history
//! of `TRANSMITTED` entries. Acquisition is the atomic step; any number
//! of simultaneous attempts on one key yields exactly one holder.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use vigil_audit::{AuditChain, EventKind, Payload};
use vigil_boundary::{BoundaryGuard, ComponentManifest};

use crate::draft::Platform;
use crate::error::{Result, SubmitError};

/// The pair that scopes the uniqueness invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionKey {
    pub decision_id: String,
    pub platform: Platform,
}

impl SubmissionKey {
    pub fn new(decision_id: impl Into<String>, platform: Platform) -> Self {
        SubmissionKey {
            decision_id: decision_id.into(),
            platform,
        }
    }
}

/// Atomic (decision, platform) guard.
pub struct DuplicateGuard {
    chain: Arc<AuditChain>,
    live: Mutex<HashSet<SubmissionKey>>,
}

impl DuplicateGuard {
    /// Construct the guard, presenting its manifest to the boundary.
    pub fn new(boundary: &BoundaryGuard, chain: Arc<AuditChain>) -> Result<Self> {
        let manifest = ComponentManifest::new("duplicate_guard")
            .with_method("check_and_acquire")
            .with_method("verify_and_release")
            .with_method("is_submitted");
        boundary.admit(&manifest)?;
        Ok(DuplicateGuard {
            chain,
            live: Mutex::new(HashSet::new()),
        })
    }

    /// Whether the chain already holds a `TRANSMITTED` entry for the key.
    pub fn is_submitted(&self, decision_id: &str, platform: Platform) -> bool {
        self.chain
            .entries_of_kind(EventKind::Transmitted)
            .iter()
            .any(|entry| {
                entry.payload.get("decision_id") == Some(decision_id)
                    && entry.payload.get("platform") == Some(platform.as_str())
            })
    }

    /// Atomically acquire the key for one transmission attempt.
    ///
    /// Refusals (historical `TRANSMITTED` entry, or another holder in
    /// flight) append `DUPLICATE_BLOCKED` and raise; exactly one of any
    /// number of simultaneous callers acquires.
    pub fn check_and_acquire(
        &self,
        decision_id: &str,
        platform: Platform,
        submitter_id: &str,
    ) -> Result<SubmissionKey> {
        let key = SubmissionKey::new(decision_id, platform);

        // Historical check against the chain snapshot first; the live
        // set is consulted and mutated under its own lock, and the
        // blocked-entry append happens after the lock is dropped.
        let already_transmitted = self.is_submitted(decision_id, platform);

        let blocked = {
            let mut live = self.live.lock();
            if already_transmitted || live.contains(&key) {
                true
            } else {
                live.insert(key.clone());
                false
            }
        };

        if blocked {
            warn!(decision_id, platform = %platform, "duplicate submission blocked");
            self.chain.append(
                EventKind::DuplicateBlocked,
                submitter_id,
                Payload::new()
                    .with("decision_id", decision_id)
                    .with("platform", platform.as_str()),
            );
            return Err(SubmitError::DuplicateSubmission {
                decision_id: decision_id.to_string(),
                platform,
            });
        }

        debug!(decision_id, platform = %platform, "submission key acquired");
        Ok(key)
    }

    /// Release the key after the transmission attempt, success or not.
    pub fn verify_and_release(&self, key: &SubmissionKey, success: bool) {
        self.live.lock().remove(key);
        debug!(
            decision_id = %key.decision_id,
            platform = %key.platform,
            success,
            "submission key released"
        );
    }

    /// Number of keys currently held by in-flight transmissions.
    pub fn active_count(&self) -> usize {
        self.live.lock().len()
    }
}
