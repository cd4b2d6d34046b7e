//! Single-use submission confirmations
//!
//! A confirmation binds a human decision to the exact hash of the draft
//! the human reviewed, for a bounded time, for exactly one consumption.
//! There is no renew, no bypass, and no batch operation.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use vigil_audit::{AuditChain, EventKind, Payload};
use vigil_boundary::{BoundaryGuard, ComponentManifest};

use crate::config::SubmissionConfig;
use crate::error::{Result, SubmitError};

/// A human's single-use authorization for one network transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfirmation {
    pub confirmation_id: Uuid,
    pub request_id: Uuid,
    pub submitter_id: String,
    /// SHA-256 hex of the confirmed draft's canonical form.
    pub report_hash: String,
    pub confirmed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub signature: String,
}

struct RegistryInner {
    issued: HashMap<Uuid, SubmissionConfirmation>,
    used: HashSet<Uuid>,
}

/// Issues and consumes confirmations.
///
/// Consumption is a single atomic step under one lock: expiry check,
/// used check, and the used-set insert cannot interleave.
pub struct ConfirmationRegistry {
    chain: Arc<AuditChain>,
    ttl: Duration,
    inner: Mutex<RegistryInner>,
}

impl ConfirmationRegistry {
    /// Construct the registry, presenting its manifest to the guard.
    pub fn new(
        guard: &BoundaryGuard,
        chain: Arc<AuditChain>,
        config: &SubmissionConfig,
    ) -> Result<Self> {
        let manifest = ComponentManifest::new("confirmation_registry")
            .with_method("issue")
            .with_method("consume")
            .with_method("is_used");
        guard.admit(&manifest)?;
        Ok(ConfirmationRegistry {
            chain,
            ttl: Duration::seconds(config.confirmation_ttl_seconds as i64),
            inner: Mutex::new(RegistryInner {
                issued: HashMap::new(),
                used: HashSet::new(),
            }),
        })
    }

    /// Issue a confirmation bound to a report hash.
    ///
    /// Records `CONFIRMATION_ISSUED` before returning.
    pub fn issue(
        &self,
        request_id: Uuid,
        submitter_id: &str,
        report_hash: &str,
    ) -> SubmissionConfirmation {
        let confirmation_id = Uuid::new_v4();
        let confirmed_at = Utc::now();
        let confirmation = SubmissionConfirmation {
            confirmation_id,
            request_id,
            submitter_id: submitter_id.to_string(),
            report_hash: report_hash.to_string(),
            confirmed_at,
            expires_at: confirmed_at + self.ttl,
            signature: sign(confirmation_id, submitter_id, report_hash),
        };

        self.inner
            .lock()
            .issued
            .insert(confirmation_id, confirmation.clone());

        self.chain.append(
            EventKind::ConfirmationIssued,
            submitter_id,
            Payload::new()
                .with("confirmation_id", confirmation_id.to_string())
                .with("request_id", request_id.to_string())
                .with("report_hash", report_hash),
        );
        info!(%confirmation_id, %request_id, "confirmation issued");
        confirmation
    }

    /// Atomically consume a confirmation.
    ///
    /// Exactly one consume per id ever succeeds; later attempts see
    /// `TokenAlreadyUsed`. Expired confirmations are refused without
    /// being marked used.
    pub fn consume(&self, confirmation_id: Uuid) -> Result<SubmissionConfirmation> {
        let confirmation = {
            let mut inner = self.inner.lock();
            if inner.used.contains(&confirmation_id) {
                warn!(%confirmation_id, "replay refused: confirmation already used");
                return Err(SubmitError::TokenAlreadyUsed { confirmation_id });
            }
            let confirmation = inner
                .issued
                .get(&confirmation_id)
                .cloned()
                .ok_or(SubmitError::UnknownConfirmation { confirmation_id })?;
            if Utc::now() > confirmation.expires_at {
                warn!(%confirmation_id, "refused: confirmation expired");
                return Err(SubmitError::TokenExpired {
                    confirmation_id,
                    expired_at: confirmation.expires_at,
                });
            }
            inner.used.insert(confirmation_id);
            confirmation
        };

        self.chain.append(
            EventKind::ConfirmationConsumed,
            &confirmation.submitter_id,
            Payload::new()
                .with("confirmation_id", confirmation_id.to_string())
                .with("request_id", confirmation.request_id.to_string()),
        );
        Ok(confirmation)
    }

    /// Whether a confirmation has been consumed.
    pub fn is_used(&self, confirmation_id: Uuid) -> bool {
        self.inner.lock().used.contains(&confirmation_id)
    }
}

fn sign(confirmation_id: Uuid, submitter_id: &str, report_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{confirmation_id}:{submitter_id}:{report_hash}"));
    format!("HC-{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_ttl(ttl_seconds: u64) -> (Arc<AuditChain>, ConfirmationRegistry) {
        let guard = BoundaryGuard::default();
        let chain = Arc::new(AuditChain::new(&guard).unwrap());
        let config = SubmissionConfig {
            confirmation_ttl_seconds: ttl_seconds,
        };
        let registry = ConfirmationRegistry::new(&guard, Arc::clone(&chain), &config).unwrap();
        (chain, registry)
    }

    #[test]
    fn test_issue_then_consume() {
        let (chain, registry) = registry_with_ttl(900);
        let confirmation = registry.issue(Uuid::new_v4(), "alice", "hash-1");
        assert!(!registry.is_used(confirmation.confirmation_id));

        let consumed = registry.consume(confirmation.confirmation_id).unwrap();
        assert_eq!(consumed.confirmation_id, confirmation.confirmation_id);
        assert!(registry.is_used(confirmation.confirmation_id));

        let kinds: Vec<EventKind> = chain.snapshot().iter().map(|e| e.event_kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::ConfirmationIssued, EventKind::ConfirmationConsumed]
        );
    }

    #[test]
    fn test_second_consume_refused() {
        let (_chain, registry) = registry_with_ttl(900);
        let confirmation = registry.issue(Uuid::new_v4(), "alice", "hash-1");
        registry.consume(confirmation.confirmation_id).unwrap();
        let err = registry.consume(confirmation.confirmation_id).unwrap_err();
        assert!(matches!(err, SubmitError::TokenAlreadyUsed { .. }));
    }

    #[test]
    fn test_expired_confirmation_refused() {
        let (_chain, registry) = registry_with_ttl(0);
        let confirmation = registry.issue(Uuid::new_v4(), "alice", "hash-1");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let err = registry.consume(confirmation.confirmation_id).unwrap_err();
        assert!(matches!(err, SubmitError::TokenExpired { .. }));
        // An expired refusal does not burn the id as "used".
        assert!(!registry.is_used(confirmation.confirmation_id));
    }

    #[test]
    fn test_unknown_confirmation_refused() {
        let (_chain, registry) = registry_with_ttl(900);
        let err = registry.consume(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, SubmitError::UnknownConfirmation { .. }));
    }

    #[test]
    fn test_exactly_one_concurrent_consume_succeeds() {
        let (_chain, registry) = registry_with_ttl(900);
        let registry = Arc::new(registry);
        let confirmation = registry.issue(Uuid::new_v4(), "alice", "hash-1");
        let id = confirmation.confirmation_id;

        let mut successes = 0;
        let mut replays = 0;
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let registry = Arc::clone(&registry);
                    scope.spawn(move || registry.consume(id).is_ok())
                })
                .collect();
            for handle in handles {
                if handle.join().unwrap() {
                    successes += 1;
                } else {
                    replays += 1;
                }
            }
        });
        assert_eq!(successes, 1);
        assert_eq!(replays, 7);
    }

    #[test]
    fn test_ttl_matches_config() {
        let (_chain, registry) = registry_with_ttl(900);
        let confirmation = registry.issue(Uuid::new_v4(), "alice", "hash-1");
        let window = confirmation.expires_at - confirmation.confirmed_at;
        assert_eq!(window, Duration::seconds(900));
    }
}
