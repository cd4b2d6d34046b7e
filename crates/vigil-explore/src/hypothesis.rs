//! Hypothesis generation
//!
//! Emits testable propositions from a target description. A generated
//! hypothesis is never a finding: every one starts untested with no
//! classification, and prioritization orders purely by ease of test.

use tracing::{info, warn};

use vigil_truth::Classification;

use crate::catalog::{templates_for, CategoryTemplates};
use crate::types::{Hypothesis, InvariantCategory, Target};

/// Affinity bump applied when the matching target flag is present.
const AFFINITY_BONUS: f64 = 0.1;

/// Generates and orders hypotheses.
#[derive(Debug, Default)]
pub struct HypothesisGenerator;

impl HypothesisGenerator {
    pub fn new() -> Self {
        HypothesisGenerator
    }

    /// Generate hypotheses for every endpoint of a target.
    ///
    /// Authorization and input validation apply everywhere; session,
    /// monetary, and workflow hypotheses are only emitted when the
    /// matching target flag is on.
    pub fn generate_from_recon(&self, target: &Target) -> Vec<Hypothesis> {
        let mut hypotheses = Vec::new();

        for endpoint in &target.endpoints {
            self.push_category(
                &mut hypotheses,
                InvariantCategory::Authorization,
                endpoint,
                target,
            );
            if target.authentication.is_some() {
                self.push_category(
                    &mut hypotheses,
                    InvariantCategory::SessionManagement,
                    endpoint,
                    target,
                );
            }
            if target.has_financial_features {
                self.push_category(
                    &mut hypotheses,
                    InvariantCategory::Monetary,
                    endpoint,
                    target,
                );
            }
            if target.has_workflow_features {
                self.push_category(
                    &mut hypotheses,
                    InvariantCategory::Workflow,
                    endpoint,
                    target,
                );
            }
            self.push_category(
                &mut hypotheses,
                InvariantCategory::InputValidation,
                endpoint,
                target,
            );
        }

        info!(
            count = hypotheses.len(),
            domain = %target.domain,
            "hypotheses generated"
        );
        hypotheses
    }

    /// Follow-up hypotheses after a SIGNAL classification.
    ///
    /// A signal is interesting, not proven; the follow-ups exist to be
    /// judged like everything else.
    pub fn generate_from_signal(&self, signal: &Classification) -> Vec<Hypothesis> {
        if !signal.is_signal() {
            warn!("generate_from_signal called with a non-SIGNAL classification");
            return Vec::new();
        }
        vec![Hypothesis::new(
            format!("Follow-up exploration for signal {}", signal.observation_id),
            Vec::new(),
            0.6,
        )]
    }

    /// Order by testability descending. Ease of test only; there is no
    /// "most likely a bug" heuristic anywhere in the ordering.
    pub fn prioritize(&self, mut hypotheses: Vec<Hypothesis>) -> Vec<Hypothesis> {
        hypotheses.sort_by(|a, b| {
            b.testability
                .partial_cmp(&a.testability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hypotheses
    }

    fn push_category(
        &self,
        out: &mut Vec<Hypothesis>,
        category: InvariantCategory,
        endpoint: &str,
        target: &Target,
    ) {
        let Some(entry) = templates_for(category) else {
            return;
        };
        let testability = self.testability(entry, target);
        for template in entry.templates {
            out.push(Hypothesis::new(
                template.replace("{endpoint}", endpoint),
                vec![category],
                testability,
            ));
        }
    }

    /// Ease-of-test for one category on one target.
    fn testability(&self, entry: &CategoryTemplates, target: &Target) -> f64 {
        let mut testability = entry.base_testability;
        match entry.category {
            InvariantCategory::Monetary if target.has_financial_features => {
                testability += AFFINITY_BONUS;
            }
            InvariantCategory::Workflow if target.has_workflow_features => {
                testability += AFFINITY_BONUS;
            }
            InvariantCategory::SessionManagement if target.authentication.is_some() => {
                testability += AFFINITY_BONUS;
            }
            _ => {}
        }
        testability.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HypothesisStatus;
    use uuid::Uuid;
    use vigil_truth::ClassificationKind;

    fn target() -> Target {
        Target {
            domain: "shop.example.com".into(),
            endpoints: vec!["/account".into(), "/checkout".into()],
            authentication: Some("session-cookie".into()),
            has_financial_features: true,
            has_workflow_features: false,
            ..Target::default()
        }
    }

    #[test]
    fn test_flagged_categories_only() {
        let hypotheses = HypothesisGenerator::new().generate_from_recon(&target());
        let categories: Vec<InvariantCategory> =
            hypotheses.iter().flat_map(|h| h.categories.clone()).collect();
        assert!(categories.contains(&InvariantCategory::Authorization));
        assert!(categories.contains(&InvariantCategory::SessionManagement));
        assert!(categories.contains(&InvariantCategory::Monetary));
        assert!(categories.contains(&InvariantCategory::InputValidation));
        // Workflow flag is off, so no workflow hypotheses exist.
        assert!(!categories.contains(&InvariantCategory::Workflow));
    }

    #[test]
    fn test_no_auth_means_no_session_hypotheses() {
        let mut target = target();
        target.authentication = None;
        let hypotheses = HypothesisGenerator::new().generate_from_recon(&target);
        assert!(!hypotheses
            .iter()
            .any(|h| h.categories.contains(&InvariantCategory::SessionManagement)));
    }

    #[test]
    fn test_all_generated_untested_and_unclassified() {
        let hypotheses = HypothesisGenerator::new().generate_from_recon(&target());
        assert!(!hypotheses.is_empty());
        for hypothesis in &hypotheses {
            assert_eq!(hypothesis.status, HypothesisStatus::Untested);
            assert!(hypothesis.classification.is_none());
        }
    }

    #[test]
    fn test_affinity_bonus_applied() {
        let hypotheses = HypothesisGenerator::new().generate_from_recon(&target());
        let monetary = hypotheses
            .iter()
            .find(|h| h.categories.contains(&InvariantCategory::Monetary))
            .unwrap();
        // Base 0.6 plus the financial affinity bump.
        assert!((monetary.testability - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_descriptions_name_the_endpoint() {
        let hypotheses = HypothesisGenerator::new().generate_from_recon(&target());
        assert!(hypotheses.iter().any(|h| h.description.contains("/account")));
        assert!(hypotheses.iter().any(|h| h.description.contains("/checkout")));
        assert!(!hypotheses.iter().any(|h| h.description.contains("{endpoint}")));
    }

    #[test]
    fn test_prioritize_orders_by_testability_only() {
        let generator = HypothesisGenerator::new();
        let hypotheses = vec![
            Hypothesis::new("low", Vec::new(), 0.2),
            Hypothesis::new("high", Vec::new(), 0.9),
            Hypothesis::new("mid", Vec::new(), 0.5),
        ];
        let ordered = generator.prioritize(hypotheses);
        let names: Vec<&str> = ordered.iter().map(|h| h.description.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_signal_follow_ups() {
        let generator = HypothesisGenerator::new();
        let signal = Classification {
            observation_id: Uuid::new_v4(),
            kind: ClassificationKind::Signal,
            invariant_violated: None,
            proof: None,
            confidence: 0.0,
            coverage_gaps: Vec::new(),
        };
        let follow_ups = generator.generate_from_signal(&signal);
        assert_eq!(follow_ups.len(), 1);
        assert_eq!(follow_ups[0].status, HypothesisStatus::Untested);

        let mut not_signal = signal;
        not_signal.kind = ClassificationKind::Bug;
        assert!(generator.generate_from_signal(&not_signal).is_empty());
    }
}
