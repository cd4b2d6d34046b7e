//! Read-only client façade
//!
//! Submits observations, mirrors the engine's answers, and refuses every
//! operation that would make the core a judge. The refusal surface is
//! explicit so misuse fails loudly instead of silently growing verdict
//! logic inside the exploration path.

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use vigil_boundary::{BoundaryGuard, ComponentManifest};

use crate::engine::TruthEngine;
use crate::error::{Result, TruthError};
use crate::types::{Classification, Observation, RateLimitStatus, ScopeValidation};

/// Read-only interface to the Truth Engine.
pub struct TruthClient {
    engine: Arc<dyn TruthEngine>,
}

impl TruthClient {
    /// Construct the client, presenting its manifest to the guard.
    pub fn new(guard: &BoundaryGuard, engine: Arc<dyn TruthEngine>) -> Result<Self> {
        let manifest = ComponentManifest::new("truth_client")
            .with_method("submit_observation")
            .with_method("scope_check")
            .with_method("rate_limit_status")
            .with_method("coverage_report");
        guard
            .admit(&manifest)
            .map_err(|e| TruthError::ArchitecturalViolation {
                attempted: "construct an unguarded Truth-Engine client".to_string(),
                remedy: e.to_string(),
            })?;
        Ok(TruthClient { engine })
    }

    /// Submit an observation for classification.
    ///
    /// The returned classification is the engine's answer verbatim.
    /// Unreachability is a hard stop; no default is fabricated.
    pub fn submit_observation(&self, observation: &Observation) -> Result<Classification> {
        info!(observation_id = %observation.id, "submitting observation to Truth Engine");
        let classification = self.engine.validate_observation(observation)?;
        if classification.observation_id != observation.id {
            return Err(TruthError::ProtocolViolation(format!(
                "classification answers observation {} but {} was submitted",
                classification.observation_id, observation.id
            )));
        }
        Ok(classification)
    }

    /// Mirror the engine's scope verdict. No local interpretation.
    pub fn scope_check(&self, target: &str) -> Result<ScopeValidation> {
        self.engine.validate_scope(target)
    }

    /// Mirror the engine's rate-limit status. `Unknown` stays `Unknown`.
    pub fn rate_limit_status(&self) -> Result<RateLimitStatus> {
        self.engine.check_rate_limit()
    }

    /// Mirror the engine's coverage report, opaque to the core.
    pub fn coverage_report(&self) -> Result<Value> {
        self.engine.coverage_report()
    }

    // ------------------------------------------------------------------
    // Refused operations. Each exists so a call site reads as a refusal
    // instead of quietly implementing the capability elsewhere.
    // ------------------------------------------------------------------

    /// Refused: classification belongs to the Truth Engine.
    pub fn refuse_classify(&self) -> TruthError {
        warn!("refused attempt to classify a finding locally");
        TruthError::ArchitecturalViolation {
            attempted: "classify a finding".to_string(),
            remedy: "submit the observation via submit_observation instead".to_string(),
        }
    }

    /// Refused: proofs belong to the Truth Engine.
    pub fn refuse_generate_proof(&self) -> TruthError {
        TruthError::ArchitecturalViolation {
            attempted: "generate a proof".to_string(),
            remedy: "the Truth Engine attaches proofs to BUG classifications".to_string(),
        }
    }

    /// Refused: confidence belongs to the Truth Engine.
    pub fn refuse_compute_confidence(&self) -> TruthError {
        TruthError::ArchitecturalViolation {
            attempted: "compute confidence".to_string(),
            remedy: "confidence arrives with the classification and is never recomputed"
                .to_string(),
        }
    }

    /// Refused: classifications are never overridden.
    pub fn refuse_override_classification(&self) -> TruthError {
        TruthError::ArchitecturalViolation {
            attempted: "override a Truth-Engine classification".to_string(),
            remedy: "classifications are authoritative and immutable".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionKind, ClassificationKind, ExplorationAction};
    use uuid::Uuid;

    struct StubEngine {
        available: bool,
        kind: ClassificationKind,
        echo_wrong_id: bool,
    }

    impl TruthEngine for StubEngine {
        fn validate_observation(&self, observation: &Observation) -> Result<Classification> {
            if !self.available {
                return Err(TruthError::EngineUnavailable("connection refused".into()));
            }
            let id = if self.echo_wrong_id {
                Uuid::new_v4()
            } else {
                observation.id
            };
            Ok(Classification {
                observation_id: id,
                kind: self.kind,
                invariant_violated: None,
                proof: None,
                confidence: 0.9,
                coverage_gaps: Vec::new(),
            })
        }

        fn validate_scope(&self, target: &str) -> Result<ScopeValidation> {
            Ok(ScopeValidation {
                target: target.to_string(),
                is_in_scope: true,
                reason: "listed".to_string(),
                warnings: Vec::new(),
            })
        }

        fn check_rate_limit(&self) -> Result<RateLimitStatus> {
            Ok(RateLimitStatus::Unknown)
        }

        fn coverage_report(&self) -> Result<Value> {
            Ok(serde_json::json!({ "invariants_tested": 3 }))
        }
    }

    fn observation() -> Observation {
        Observation::new(
            Uuid::new_v4(),
            ExplorationAction::new(ActionKind::HttpRequest, "/search"),
        )
    }

    fn client(engine: StubEngine) -> TruthClient {
        TruthClient::new(&BoundaryGuard::default(), Arc::new(engine)).unwrap()
    }

    #[test]
    fn test_submit_mirrors_engine_answer() {
        let client = client(StubEngine {
            available: true,
            kind: ClassificationKind::Signal,
            echo_wrong_id: false,
        });
        let obs = observation();
        let classification = client.submit_observation(&obs).unwrap();
        assert_eq!(classification.observation_id, obs.id);
        assert!(classification.is_signal());
    }

    #[test]
    fn test_unavailable_engine_is_hard_stop() {
        let client = client(StubEngine {
            available: false,
            kind: ClassificationKind::NoIssue,
            echo_wrong_id: false,
        });
        let err = client.submit_observation(&observation()).unwrap_err();
        assert!(matches!(err, TruthError::EngineUnavailable(_)));
    }

    #[test]
    fn test_mismatched_answer_is_protocol_violation() {
        let client = client(StubEngine {
            available: true,
            kind: ClassificationKind::NoIssue,
            echo_wrong_id: true,
        });
        let err = client.submit_observation(&observation()).unwrap_err();
        assert!(matches!(err, TruthError::ProtocolViolation(_)));
    }

    #[test]
    fn test_unknown_rate_limit_is_not_ok() {
        let client = client(StubEngine {
            available: true,
            kind: ClassificationKind::NoIssue,
            echo_wrong_id: false,
        });
        assert_eq!(
            client.rate_limit_status().unwrap(),
            RateLimitStatus::Unknown
        );
    }

    #[test]
    fn test_refusals_are_violations() {
        let client = client(StubEngine {
            available: true,
            kind: ClassificationKind::NoIssue,
            echo_wrong_id: false,
        });
        assert!(matches!(
            client.refuse_classify(),
            TruthError::ArchitecturalViolation { .. }
        ));
        assert!(matches!(
            client.refuse_override_classification(),
            TruthError::ArchitecturalViolation { .. }
        ));
    }
}
