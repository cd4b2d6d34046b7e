//! Bounded retries for transient tool failures
//!
//! Retries are bounded, recorded, and never a way around the Truth
//! Engine: a retry re-executes the hypothesis and resubmits, it never
//! fabricates or reuses a classification. Persistent failures are
//! escalated for human review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use vigil_truth::Classification;

use crate::error::Result;
use crate::types::Hypothesis;

/// Default retry bound per hypothesis.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Failures before a hypothesis is escalated to human review.
pub const ESCALATION_THRESHOLD: u32 = 5;

/// One recorded attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryAttempt {
    pub attempt_number: u32,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Accumulated failure history for one hypothesis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FailurePattern {
    pub failure_count: u32,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub needs_human_review: bool,
}

/// Bounded retry driver with failure bookkeeping.
pub struct RetryManager {
    max_retries: u32,
    backoff_base: Duration,
    backoff_multiplier: u32,
    patterns: HashMap<Uuid, FailurePattern>,
    history: HashMap<Uuid, Vec<RetryAttempt>>,
}

impl RetryManager {
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        RetryManager {
            max_retries,
            backoff_base,
            backoff_multiplier: 2,
            patterns: HashMap::new(),
            history: HashMap::new(),
        }
    }

    /// Execute with bounded retries.
    ///
    /// `vary` may adjust the hypothesis per attempt (parameter
    /// variation). Hard stops propagate immediately and are never
    /// retried. Exhausted retries return `Ok(None)` with the failure
    /// pattern updated.
    pub fn execute_with_retry(
        &mut self,
        hypothesis: &Hypothesis,
        execute: &dyn Fn(&Hypothesis) -> Result<Classification>,
        vary: Option<&dyn Fn(&Hypothesis, u32) -> Hypothesis>,
    ) -> Result<Option<Classification>> {
        let mut attempts = Vec::new();

        for attempt in 0..=self.max_retries {
            let current = match (attempt, vary) {
                (0, _) | (_, None) => hypothesis.clone(),
                (n, Some(vary)) => {
                    info!(attempt = n, hypothesis_id = %hypothesis.id, "retrying with variation");
                    vary(hypothesis, n)
                }
            };

            match execute(&current) {
                Ok(classification) => {
                    attempts.push(RetryAttempt {
                        attempt_number: attempt,
                        timestamp: Utc::now(),
                        success: true,
                        error_message: None,
                    });
                    if attempt > 0 {
                        self.pattern_mut(hypothesis.id).retry_count += attempt;
                    }
                    self.history.insert(hypothesis.id, attempts);
                    return Ok(Some(classification));
                }
                Err(e) if e.is_hard_stop() => {
                    // The Truth Engine going away is never retried around.
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        hypothesis_id = %hypothesis.id,
                        error = %e,
                        "attempt failed"
                    );
                    attempts.push(RetryAttempt {
                        attempt_number: attempt,
                        timestamp: Utc::now(),
                        success: false,
                        error_message: Some(e.to_string()),
                    });
                    self.record_failure(hypothesis.id, &e.to_string());
                    if attempt < self.max_retries {
                        std::thread::sleep(self.backoff_for(attempt));
                    }
                }
            }
        }

        self.history.insert(hypothesis.id, attempts);
        Ok(None)
    }

    /// Hypotheses whose failures crossed the escalation threshold.
    pub fn escalated(&self) -> Vec<Uuid> {
        self.patterns
            .iter()
            .filter(|(_, pattern)| pattern.needs_human_review)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Failure pattern for one hypothesis, if any failure occurred.
    pub fn pattern(&self, hypothesis_id: Uuid) -> Option<&FailurePattern> {
        self.patterns.get(&hypothesis_id)
    }

    /// Recorded attempts for one hypothesis.
    pub fn attempts(&self, hypothesis_id: Uuid) -> &[RetryAttempt] {
        self.history
            .get(&hypothesis_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn record_failure(&mut self, hypothesis_id: Uuid, message: &str) {
        let threshold = ESCALATION_THRESHOLD;
        let pattern = self.pattern_mut(hypothesis_id);
        pattern.failure_count += 1;
        pattern.last_error = Some(message.to_string());
        if pattern.failure_count >= threshold {
            pattern.needs_human_review = true;
        }
    }

    fn pattern_mut(&mut self, hypothesis_id: Uuid) -> &mut FailurePattern {
        self.patterns.entry(hypothesis_id).or_default()
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base * self.backoff_multiplier.saturating_pow(attempt)
    }
}

impl Default for RetryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, Duration::from_secs(1))
    }
}
