//! Pending-submission guard
//!
//! The explorer must not react to an observation whose classification
//! has not returned. The guard tracks in-flight ids and performs
//! submit-and-clear as a single step.

use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use crate::client::TruthClient;
use crate::error::Result;
use crate::types::{Classification, Observation};

/// Tracks observations that are registered but not yet classified.
pub struct SubmissionGuard<'a> {
    client: &'a TruthClient,
    pending: Mutex<HashSet<Uuid>>,
}

impl<'a> SubmissionGuard<'a> {
    pub fn new(client: &'a TruthClient) -> Self {
        SubmissionGuard {
            client,
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Register an observation as awaiting submission.
    pub fn register(&self, observation: &Observation) {
        self.pending.lock().insert(observation.id);
        debug!(observation_id = %observation.id, "observation registered as pending");
    }

    /// Submit to the engine and clear the pending mark in one step.
    ///
    /// Blocks until the classification returns; the pending mark is
    /// only removed once an answer exists.
    pub fn submit_and_clear(&self, observation: &Observation) -> Result<Classification> {
        let classification = self.client.submit_observation(observation)?;
        self.pending.lock().remove(&observation.id);
        debug!(observation_id = %observation.id, "pending observation cleared");
        Ok(classification)
    }

    /// Whether any observation is still awaiting classification.
    pub fn has_pending(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    /// Count of observations awaiting classification.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether a specific observation is still pending.
    pub fn is_pending(&self, observation_id: Uuid) -> bool {
        self.pending.lock().contains(&observation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TruthEngine;
    use crate::error::TruthError;
    use crate::types::{
        ActionKind, ClassificationKind, ExplorationAction, RateLimitStatus, ScopeValidation,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use vigil_boundary::BoundaryGuard;

    struct StubEngine {
        available: bool,
    }

    impl TruthEngine for StubEngine {
        fn validate_observation(&self, observation: &Observation) -> Result<Classification> {
            if !self.available {
                return Err(TruthError::EngineUnavailable("down".into()));
            }
            Ok(Classification {
                observation_id: observation.id,
                kind: ClassificationKind::NoIssue,
                invariant_violated: None,
                proof: None,
                confidence: 0.5,
                coverage_gaps: Vec::new(),
            })
        }

        fn validate_scope(&self, target: &str) -> Result<ScopeValidation> {
            Ok(ScopeValidation {
                target: target.to_string(),
                is_in_scope: true,
                reason: String::new(),
                warnings: Vec::new(),
            })
        }

        fn check_rate_limit(&self) -> Result<RateLimitStatus> {
            Ok(RateLimitStatus::Ok)
        }

        fn coverage_report(&self) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    fn observation() -> Observation {
        Observation::new(
            Uuid::new_v4(),
            ExplorationAction::new(ActionKind::HttpRequest, "/account"),
        )
    }

    #[test]
    fn test_submit_and_clear_removes_pending() {
        let client =
            TruthClient::new(&BoundaryGuard::default(), Arc::new(StubEngine { available: true }))
                .unwrap();
        let guard = SubmissionGuard::new(&client);
        let obs = observation();
        guard.register(&obs);
        assert!(guard.is_pending(obs.id));
        assert_eq!(guard.pending_count(), 1);

        guard.submit_and_clear(&obs).unwrap();
        assert!(!guard.is_pending(obs.id));
        assert!(!guard.has_pending());
    }

    #[test]
    fn test_failed_submission_stays_pending() {
        let client = TruthClient::new(
            &BoundaryGuard::default(),
            Arc::new(StubEngine { available: false }),
        )
        .unwrap();
        let guard = SubmissionGuard::new(&client);
        let obs = observation();
        guard.register(&obs);
        assert!(guard.submit_and_clear(&obs).is_err());
        // No classification arrived, so the mark stays.
        assert!(guard.is_pending(obs.id));
    }
}
