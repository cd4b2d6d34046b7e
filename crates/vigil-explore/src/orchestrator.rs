//! Sequential exploration orchestrator
//!
//! Drives prioritized hypotheses through the executor and the Truth
//! Engine, applies the feedback reactions, and stops on budget
//! exhaustion, stop-loss, or the Truth-Engine hard stop. The summary
//! reports what happened; it claims nothing about coverage.

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use vigil_audit::{AuditChain, EventKind, Payload};
use vigil_boundary::{BoundaryGuard, ComponentManifest};
use vigil_truth::{Observation, SubmissionGuard, TruthClient};

use crate::budget::GlobalBudget;
use crate::error::{ExploreError, Result};
use crate::feedback::{ExplorationAdjustment, FeedbackReactor};
use crate::hypothesis::HypothesisGenerator;
use crate::types::{
    ExplorationStats, ExplorationSummary, Hypothesis, HypothesisStatus, InvariantCategory, Target,
};

/// Stop reason recorded when the Truth Engine goes away mid-run.
pub const HARD_STOP_REASON: &str = "Truth Engine unavailable (HARD STOP)";

/// Executes one hypothesis against the real target, producing an
/// observation for the Truth Engine. Supplied by the embedding layer;
/// the orchestrator never interprets what it did.
pub type HypothesisExecutor<'a> = dyn Fn(&Hypothesis) -> Result<Observation> + Sync + 'a;

/// Sequential exploration driver.
pub struct Orchestrator<'a> {
    client: &'a TruthClient,
    chain: Arc<AuditChain>,
    budget: GlobalBudget,
    generator: HypothesisGenerator,
    reactor: FeedbackReactor,
    stats: ExplorationStats,
    tested: Vec<Uuid>,
    stopped_categories: Vec<InvariantCategory>,
}

impl<'a> Orchestrator<'a> {
    /// Construct the orchestrator, presenting its manifest to the guard.
    pub fn new(
        guard: &BoundaryGuard,
        client: &'a TruthClient,
        chain: Arc<AuditChain>,
        budget: GlobalBudget,
    ) -> Result<Self> {
        let manifest = ComponentManifest::new("exploration_orchestrator")
            .with_method("explore")
            .with_method("stats")
            .with_method("budget");
        guard.admit(&manifest)?;
        Ok(Orchestrator {
            client,
            chain,
            budget,
            generator: HypothesisGenerator::new(),
            reactor: FeedbackReactor::new(),
            stats: ExplorationStats::default(),
            tested: Vec::new(),
            stopped_categories: Vec::new(),
        })
    }

    /// Explore one target to completion or stop.
    pub fn explore(&mut self, target: &Target, executor: &HypothesisExecutor) -> ExplorationSummary {
        let session_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(session_id = %session_id, domain = %target.domain, "exploration starting");

        self.chain.append(
            EventKind::ExplorationStarted,
            "orchestrator",
            Payload::new()
                .with("session_id", session_id.to_string())
                .with("target", target.domain.clone()),
        );

        let stopped_reason = match self.run(target, executor) {
            Ok(reason) => reason,
            Err(e) if e.is_hard_stop() => {
                error!(error = %e, "exploration hard stop");
                HARD_STOP_REASON.to_string()
            }
            Err(e) => e.to_string(),
        };

        self.chain.append(
            EventKind::ExplorationStopped,
            "orchestrator",
            Payload::new()
                .with("session_id", session_id.to_string())
                .with("stopped_reason", stopped_reason.clone()),
        );

        ExplorationSummary {
            session_id,
            target: target.domain.clone(),
            stats: self.stats.clone(),
            hypotheses_tested: self.tested.clone(),
            strategies_used: vec!["template-catalog".to_string()],
            boundary_status: self.budget.status(),
            stopped_reason,
            started_at,
            completed_at: Utc::now(),
        }
    }

    fn run(&mut self, target: &Target, executor: &HypothesisExecutor) -> Result<String> {
        let scope = self.client.scope_check(&target.domain)?;
        if !scope.is_in_scope {
            warn!(target = %target.domain, reason = %scope.reason, "target refused by scope");
            return Err(ExploreError::ScopeRefused {
                target: target.domain.clone(),
                reason: scope.reason,
            });
        }

        let generated = self.generator.generate_from_recon(target);
        self.stats.hypotheses_generated = generated.len();
        let mut queue = self.generator.prioritize(generated);

        while let Some(mut hypothesis) = pop_next(&mut queue, &self.stopped_categories) {
            if !self.budget.consume_action() {
                return Ok("Action budget exhausted".to_string());
            }
            if self.budget.is_time_exceeded() {
                return Ok("Time limit exceeded".to_string());
            }
            self.stats.actions_executed += 1;
            hypothesis.status = HypothesisStatus::Testing;

            let observation = match executor(&hypothesis) {
                Ok(observation) => observation,
                Err(e) if e.is_hard_stop() => return Err(e),
                Err(e) => {
                    // Tool failures are local: record, mark, continue.
                    warn!(hypothesis_id = %hypothesis.id, error = %e, "tool failure");
                    self.stats.errors_encountered += 1;
                    hypothesis.mark_untestable();
                    self.tested.push(hypothesis.id);
                    continue;
                }
            };

            if !self.budget.consume_submission() {
                return Ok("Submission budget exhausted".to_string());
            }

            let guard = SubmissionGuard::new(self.client);
            guard.register(&observation);
            hypothesis.status = HypothesisStatus::Submitted;
            self.chain.append(
                EventKind::ObservationSubmitted,
                "orchestrator",
                Payload::new()
                    .with("observation_id", observation.id.to_string())
                    .with("hypothesis_id", hypothesis.id.to_string()),
            );

            let classification = guard.submit_and_clear(&observation)?;
            self.stats.observations_submitted += 1;
            self.chain.append(
                EventKind::ClassificationReceived,
                "truth_engine",
                Payload::new()
                    .with("observation_id", observation.id.to_string())
                    .with("kind", format!("{:?}", classification.kind)),
            );

            self.count(&classification);
            let adjustment = self.reactor.react(&mut hypothesis, classification.clone());
            self.tested.push(hypothesis.id);
            self.stats.hypotheses_tested += 1;

            match adjustment {
                ExplorationAdjustment::Continue => {}
                ExplorationAdjustment::StopPath => {
                    // The bug is proven; nothing more to learn on this path.
                }
                ExplorationAdjustment::Deprioritize => {
                    demote_similar(&mut queue, &hypothesis);
                }
                ExplorationAdjustment::IncreaseDepth => {
                    let breadth = self.budget.limits().max_breadth as usize;
                    if queue.len() < breadth {
                        queue.extend(self.generator.generate_from_signal(&classification));
                    }
                }
                ExplorationAdjustment::StopCategory => {
                    for category in &hypothesis.categories {
                        if !self.stopped_categories.contains(category) {
                            self.stopped_categories.push(*category);
                        }
                    }
                }
            }

            if self.reactor.stop_loss_triggered() {
                self.chain.append(
                    EventKind::StopLossTriggered,
                    "orchestrator",
                    Payload::new().with("hypothesis_id", hypothesis.id.to_string()),
                );
                return Ok("Stop-loss triggered".to_string());
            }
        }

        Ok("All hypotheses tested".to_string())
    }

    fn count(&mut self, classification: &vigil_truth::Classification) {
        if classification.is_bug() {
            self.stats.bugs_found += 1;
        } else if classification.is_signal() {
            self.stats.signals_found += 1;
        } else if classification.is_no_issue() {
            self.stats.no_issues += 1;
        } else {
            self.stats.coverage_gaps += 1;
        }
    }

    /// Counters collected so far.
    pub fn stats(&self) -> &ExplorationStats {
        &self.stats
    }

    /// Budget view for callers that surface progress.
    pub fn budget(&self) -> &GlobalBudget {
        &self.budget
    }
}

fn pop_next(
    queue: &mut Vec<Hypothesis>,
    stopped_categories: &[InvariantCategory],
) -> Option<Hypothesis> {
    while !queue.is_empty() {
        let hypothesis = queue.remove(0);
        let stopped = hypothesis
            .categories
            .iter()
            .any(|category| stopped_categories.contains(category));
        if !stopped {
            return Some(hypothesis);
        }
    }
    None
}

fn demote_similar(queue: &mut Vec<Hypothesis>, resolved: &Hypothesis) {
    let mut demoted = Vec::new();
    let mut index = 0;
    while index < queue.len() {
        let similar = queue[index]
            .categories
            .iter()
            .any(|category| resolved.categories.contains(category));
        if similar {
            demoted.push(queue.remove(index));
        } else {
            index += 1;
        }
    }
    queue.extend(demoted);
}
