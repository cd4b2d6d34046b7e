//! Parallel exploration
//!
//! A bounded worker pool over one shared budget. Workers pull from a
//! common queue, coordinate submissions so no observation reaches the
//! Truth Engine twice, and shed parallelism when the engine reports
//! rate pressure. The Truth-Engine hard stop drains the whole pool.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use vigil_boundary::{BoundaryGuard, ComponentManifest};
use vigil_truth::{Classification, Observation, RateLimitStatus, TruthClient};

use crate::budget::GlobalBudget;
use crate::config::ParallelConfig;
use crate::error::{ExploreError, Result};
use crate::types::{ExplorationStats, Hypothesis};

/// Deduplicates observation submissions across workers.
pub struct SubmissionCoordinator {
    submitted: Mutex<HashSet<Uuid>>,
}

impl SubmissionCoordinator {
    pub fn new() -> Self {
        SubmissionCoordinator {
            submitted: Mutex::new(HashSet::new()),
        }
    }

    /// Mark an observation as claimed for submission. False when some
    /// other worker already claimed it.
    pub fn try_claim(&self, observation_id: Uuid) -> bool {
        self.submitted.lock().insert(observation_id)
    }

    /// Whether the observation was ever claimed.
    pub fn is_submitted(&self, observation_id: Uuid) -> bool {
        self.submitted.lock().contains(&observation_id)
    }

    /// Number of claimed observations.
    pub fn submission_count(&self) -> usize {
        self.submitted.lock().len()
    }
}

impl Default for SubmissionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// What one worker produced for one hypothesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerOutcome {
    pub worker_index: usize,
    pub hypothesis_id: Uuid,
    pub classification: Option<Classification>,
    pub error: Option<String>,
}

impl WorkerOutcome {
    pub fn succeeded(&self) -> bool {
        self.classification.is_some()
    }
}

/// Bounded parallel exploration over one shared budget.
pub struct ParallelExplorer<'a> {
    client: &'a TruthClient,
    budget: Arc<GlobalBudget>,
    coordinator: SubmissionCoordinator,
    max_workers: usize,
    floor: usize,
    allowed_workers: AtomicUsize,
}

impl<'a> ParallelExplorer<'a> {
    /// Construct the pool, presenting its manifest to the guard.
    pub fn new(
        guard: &BoundaryGuard,
        client: &'a TruthClient,
        budget: Arc<GlobalBudget>,
        config: &ParallelConfig,
    ) -> Result<Self> {
        let manifest = ComponentManifest::new("parallel_explorer")
            .with_method("explore")
            .with_method("current_workers");
        guard.admit(&manifest)?;
        let max_workers = config.workers.max(1);
        let floor = config.rate_limit_floor.clamp(1, max_workers);
        Ok(ParallelExplorer {
            client,
            budget,
            coordinator: SubmissionCoordinator::new(),
            max_workers,
            floor,
            allowed_workers: AtomicUsize::new(max_workers),
        })
    }

    /// Current worker target after any rate-limit reductions.
    pub fn current_workers(&self) -> usize {
        self.allowed_workers.load(Ordering::SeqCst)
    }

    /// Coordinator view for callers that track submissions.
    pub fn coordinator(&self) -> &SubmissionCoordinator {
        &self.coordinator
    }

    /// Test hypotheses across the worker pool.
    ///
    /// Returns every worker outcome, or the hard-stop error when the
    /// Truth Engine became unavailable (remaining work is abandoned).
    pub fn explore(
        &self,
        hypotheses: Vec<Hypothesis>,
        executor: &(dyn Fn(&Hypothesis) -> Result<Observation> + Sync),
    ) -> Result<Vec<WorkerOutcome>> {
        if self.budget.is_exhausted() {
            return Err(ExploreError::BudgetExhausted {
                resource: "budget exhausted before parallel exploration".to_string(),
            });
        }

        let queue = Mutex::new(VecDeque::from(hypotheses));
        let outcomes = Mutex::new(Vec::new());
        let hard_stop: Mutex<Option<ExploreError>> = Mutex::new(None);

        std::thread::scope(|scope| {
            for worker_index in 0..self.max_workers {
                let queue = &queue;
                let outcomes = &outcomes;
                let hard_stop = &hard_stop;
                scope.spawn(move || {
                    self.worker_loop(worker_index, queue, outcomes, hard_stop, executor);
                });
            }
        });

        if let Some(error) = hard_stop.into_inner() {
            return Err(error);
        }
        Ok(outcomes.into_inner())
    }

    fn worker_loop(
        &self,
        worker_index: usize,
        queue: &Mutex<VecDeque<Hypothesis>>,
        outcomes: &Mutex<Vec<WorkerOutcome>>,
        hard_stop: &Mutex<Option<ExploreError>>,
        executor: &(dyn Fn(&Hypothesis) -> Result<Observation> + Sync),
    ) {
        loop {
            if hard_stop.lock().is_some() {
                return;
            }
            // Shed workers beyond the current target.
            if worker_index >= self.allowed_workers.load(Ordering::SeqCst) {
                debug!(worker_index, "worker shed by rate-limit reduction");
                return;
            }
            let Some(hypothesis) = queue.lock().pop_front() else {
                return;
            };
            if !self.budget.consume_action() {
                return;
            }

            let outcome = self.test_one(worker_index, &hypothesis, executor);
            match outcome {
                Ok(outcome) => outcomes.lock().push(outcome),
                Err(e) if e.is_hard_stop() => {
                    error!(worker_index, error = %e, "worker hit hard stop");
                    let mut slot = hard_stop.lock();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    return;
                }
                Err(e) => outcomes.lock().push(WorkerOutcome {
                    worker_index,
                    hypothesis_id: hypothesis.id,
                    classification: None,
                    error: Some(e.to_string()),
                }),
            }

            self.apply_rate_pressure();
        }
    }

    fn test_one(
        &self,
        worker_index: usize,
        hypothesis: &Hypothesis,
        executor: &(dyn Fn(&Hypothesis) -> Result<Observation> + Sync),
    ) -> Result<WorkerOutcome> {
        let observation = executor(hypothesis)?;

        if !self.budget.consume_submission() {
            return Ok(WorkerOutcome {
                worker_index,
                hypothesis_id: hypothesis.id,
                classification: None,
                error: Some("Submission budget exhausted".to_string()),
            });
        }
        if !self.coordinator.try_claim(observation.id) {
            return Ok(WorkerOutcome {
                worker_index,
                hypothesis_id: hypothesis.id,
                classification: None,
                error: Some("Duplicate submission skipped".to_string()),
            });
        }

        let classification = self.client.submit_observation(&observation)?;
        Ok(WorkerOutcome {
            worker_index,
            hypothesis_id: hypothesis.id,
            classification: Some(classification),
            error: None,
        })
    }

    /// Halve the worker target (down to the floor) under rate pressure.
    fn apply_rate_pressure(&self) {
        let status = match self.client.rate_limit_status() {
            Ok(status) => status,
            Err(_) => return,
        };
        if matches!(
            status,
            RateLimitStatus::Approaching | RateLimitStatus::Exceeded
        ) {
            let current = self.allowed_workers.load(Ordering::SeqCst);
            let reduced = (current / 2).max(self.floor);
            if reduced < current {
                warn!(current, reduced, "rate pressure; reducing workers");
                self.allowed_workers.store(reduced, Ordering::SeqCst);
            }
        }
    }

    /// Merge worker outcomes into session counters.
    pub fn merge_outcomes(&self, outcomes: &[WorkerOutcome]) -> ExplorationStats {
        let mut stats = ExplorationStats::default();
        for outcome in outcomes {
            match &outcome.classification {
                Some(classification) => {
                    stats.hypotheses_tested += 1;
                    stats.observations_submitted += 1;
                    if classification.is_bug() {
                        stats.bugs_found += 1;
                    } else if classification.is_signal() {
                        stats.signals_found += 1;
                    } else if classification.is_no_issue() {
                        stats.no_issues += 1;
                    } else {
                        stats.coverage_gaps += 1;
                    }
                }
                None => stats.errors_encountered += 1,
            }
        }
        stats
    }
}
