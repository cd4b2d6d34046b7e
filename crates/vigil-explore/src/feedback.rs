//! Deterministic feedback reactions
//!
//! The same classification always yields the same adjustment. The
//! reactor keeps per-category counters for its stop-loss rules but
//! never modifies, reweights, or second-guesses a classification.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use vigil_truth::Classification;

use crate::types::{Hypothesis, InvariantCategory};

/// If a category's signal rate passes this, explore it deeper.
pub const SIGNAL_DEPTH_THRESHOLD: f64 = 0.3;
/// If a category's no-issue rate passes this, stop the category.
pub const NO_ISSUE_STOP_THRESHOLD: f64 = 0.8;
/// Minimum samples before the category rate rule applies.
pub const NO_ISSUE_MIN_SAMPLES: usize = 5;
/// Consecutive no-issues before the global stop-loss fires.
pub const CONSECUTIVE_NO_ISSUE_LIMIT: usize = 10;

/// How exploration should proceed after one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplorationAdjustment {
    /// Keep going as planned.
    Continue,
    /// A bug is proven on this path; stop exploring it.
    StopPath,
    /// Push similar hypotheses toward the back of the queue.
    Deprioritize,
    /// Expand variants in this category.
    IncreaseDepth,
    /// Diminishing returns; stop the category.
    StopCategory,
}

/// Counters for one invariant category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryStats {
    pub bugs: usize,
    pub signals: usize,
    pub no_issues: usize,
    pub coverage_gaps: usize,
    pub total_tested: usize,
}

impl CategoryStats {
    pub fn signal_rate(&self) -> f64 {
        if self.total_tested == 0 {
            0.0
        } else {
            self.signals as f64 / self.total_tested as f64
        }
    }

    pub fn no_issue_rate(&self) -> f64 {
        if self.total_tested == 0 {
            0.0
        } else {
            self.no_issues as f64 / self.total_tested as f64
        }
    }
}

/// Reacts to classifications with fixed rules.
#[derive(Debug, Default)]
pub struct FeedbackReactor {
    category_stats: HashMap<InvariantCategory, CategoryStats>,
    consecutive_no_issues: usize,
    total_classifications: usize,
}

impl FeedbackReactor {
    pub fn new() -> Self {
        FeedbackReactor::default()
    }

    /// Adopt a classification onto its hypothesis and decide the
    /// adjustment. The classification itself is stored untouched.
    pub fn react(
        &mut self,
        hypothesis: &mut Hypothesis,
        classification: Classification,
    ) -> ExplorationAdjustment {
        self.record(hypothesis, &classification);

        let adjustment = if classification.is_bug() {
            info!(
                hypothesis_id = %hypothesis.id,
                invariant = ?classification.invariant_violated,
                "BUG classification received; stopping this path"
            );
            self.consecutive_no_issues = 0;
            ExplorationAdjustment::StopPath
        } else if classification.is_signal() {
            self.consecutive_no_issues = 0;
            if hypothesis.categories.iter().any(|category| {
                self.stats(*category).signal_rate() > SIGNAL_DEPTH_THRESHOLD
            }) {
                debug!("high signal rate; increasing depth");
                ExplorationAdjustment::IncreaseDepth
            } else {
                ExplorationAdjustment::Continue
            }
        } else if classification.is_no_issue() {
            self.consecutive_no_issues += 1;
            if self.consecutive_no_issues >= CONSECUTIVE_NO_ISSUE_LIMIT {
                info!("consecutive no-issue limit reached");
                ExplorationAdjustment::StopCategory
            } else if hypothesis.categories.iter().any(|category| {
                let stats = self.stats(*category);
                stats.no_issue_rate() > NO_ISSUE_STOP_THRESHOLD
                    && stats.total_tested > NO_ISSUE_MIN_SAMPLES
            }) {
                info!("high no-issue rate; stopping category");
                ExplorationAdjustment::StopCategory
            } else {
                ExplorationAdjustment::Deprioritize
            }
        } else {
            // Coverage gap: logged, never counted as a finding.
            debug!(
                gaps = ?classification.coverage_gaps,
                "coverage gap reported; continuing"
            );
            ExplorationAdjustment::Continue
        };

        hypothesis.resolve(classification);
        adjustment
    }

    /// Whether a category is still worth exploring.
    pub fn should_continue_category(&self, category: InvariantCategory) -> bool {
        match self.category_stats.get(&category) {
            None => true,
            Some(stats) => {
                !(stats.no_issue_rate() > NO_ISSUE_STOP_THRESHOLD
                    && stats.total_tested > NO_ISSUE_MIN_SAMPLES)
            }
        }
    }

    /// Global stop-loss over all categories.
    pub fn stop_loss_triggered(&self) -> bool {
        if self.consecutive_no_issues >= CONSECUTIVE_NO_ISSUE_LIMIT {
            return true;
        }
        if self.total_classifications > 10 {
            let total_no_issues: usize =
                self.category_stats.values().map(|s| s.no_issues).sum();
            if total_no_issues as f64 / self.total_classifications as f64
                > NO_ISSUE_STOP_THRESHOLD
            {
                return true;
            }
        }
        false
    }

    /// Counters for one category, zeroes when untouched.
    pub fn stats(&self, category: InvariantCategory) -> CategoryStats {
        self.category_stats.get(&category).cloned().unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.category_stats.clear();
        self.consecutive_no_issues = 0;
        self.total_classifications = 0;
    }

    fn record(&mut self, hypothesis: &Hypothesis, classification: &Classification) {
        self.total_classifications += 1;
        for category in &hypothesis.categories {
            let stats = self.category_stats.entry(*category).or_default();
            stats.total_tested += 1;
            if classification.is_bug() {
                stats.bugs += 1;
            } else if classification.is_signal() {
                stats.signals += 1;
            } else if classification.is_no_issue() {
                stats.no_issues += 1;
            } else {
                stats.coverage_gaps += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use vigil_truth::ClassificationKind;

    fn classification(kind: ClassificationKind) -> Classification {
        Classification {
            observation_id: Uuid::new_v4(),
            kind,
            invariant_violated: None,
            proof: None,
            confidence: 0.0,
            coverage_gaps: Vec::new(),
        }
    }

    fn hypothesis(category: InvariantCategory) -> Hypothesis {
        Hypothesis::new("h", vec![category], 0.7)
    }

    #[test]
    fn test_bug_stops_path() {
        let mut reactor = FeedbackReactor::new();
        let mut h = hypothesis(InvariantCategory::Authorization);
        let adjustment = reactor.react(&mut h, classification(ClassificationKind::Bug));
        assert_eq!(adjustment, ExplorationAdjustment::StopPath);
        assert!(h.classification.is_some());
        assert_eq!(reactor.stats(InvariantCategory::Authorization).bugs, 1);
    }

    #[test]
    fn test_reaction_is_deterministic() {
        for _ in 0..3 {
            let mut reactor = FeedbackReactor::new();
            let mut h = hypothesis(InvariantCategory::Workflow);
            assert_eq!(
                reactor.react(&mut h, classification(ClassificationKind::Bug)),
                ExplorationAdjustment::StopPath
            );
        }
    }

    #[test]
    fn test_signal_rate_increases_depth() {
        let mut reactor = FeedbackReactor::new();
        // First signal: rate 1.0 > 0.3, depth increases immediately.
        let mut h = hypothesis(InvariantCategory::Trust);
        let adjustment = reactor.react(&mut h, classification(ClassificationKind::Signal));
        assert_eq!(adjustment, ExplorationAdjustment::IncreaseDepth);
    }

    #[test]
    fn test_no_issue_deprioritizes_then_stops_category() {
        let mut reactor = FeedbackReactor::new();
        for n in 0..NO_ISSUE_MIN_SAMPLES + 1 {
            let mut h = hypothesis(InvariantCategory::InputValidation);
            let adjustment = reactor.react(&mut h, classification(ClassificationKind::NoIssue));
            if n < NO_ISSUE_MIN_SAMPLES {
                assert_eq!(adjustment, ExplorationAdjustment::Deprioritize);
            } else {
                // Rate 1.0 with more than the minimum samples.
                assert_eq!(adjustment, ExplorationAdjustment::StopCategory);
            }
        }
        assert!(!reactor.should_continue_category(InvariantCategory::InputValidation));
        assert!(reactor.should_continue_category(InvariantCategory::Monetary));
    }

    #[test]
    fn test_consecutive_no_issue_stop_loss() {
        let mut reactor = FeedbackReactor::new();
        // Spread across categories so the per-category rule stays quiet.
        let categories = [
            InvariantCategory::Authorization,
            InvariantCategory::Monetary,
            InvariantCategory::Workflow,
            InvariantCategory::Trust,
            InvariantCategory::SessionManagement,
        ];
        for n in 0..CONSECUTIVE_NO_ISSUE_LIMIT {
            let mut h = hypothesis(categories[n % categories.len()]);
            reactor.react(&mut h, classification(ClassificationKind::NoIssue));
        }
        assert!(reactor.stop_loss_triggered());
    }

    #[test]
    fn test_bug_resets_consecutive_counter() {
        let mut reactor = FeedbackReactor::new();
        for _ in 0..CONSECUTIVE_NO_ISSUE_LIMIT - 1 {
            let mut h = hypothesis(InvariantCategory::Authorization);
            reactor.react(&mut h, classification(ClassificationKind::NoIssue));
        }
        let mut h = hypothesis(InvariantCategory::Authorization);
        reactor.react(&mut h, classification(ClassificationKind::Bug));
        assert!(!reactor.stop_loss_triggered());
    }

    #[test]
    fn test_coverage_gap_is_not_a_finding() {
        let mut reactor = FeedbackReactor::new();
        let mut h = hypothesis(InvariantCategory::DataIntegrity);
        let adjustment = reactor.react(&mut h, classification(ClassificationKind::CoverageGap));
        assert_eq!(adjustment, ExplorationAdjustment::Continue);
        let stats = reactor.stats(InvariantCategory::DataIntegrity);
        assert_eq!(stats.bugs, 0);
        assert_eq!(stats.coverage_gaps, 1);
    }

    #[test]
    fn test_classification_stored_untouched() {
        let mut reactor = FeedbackReactor::new();
        let mut h = hypothesis(InvariantCategory::Authorization);
        let mut c = classification(ClassificationKind::Bug);
        c.confidence = 0.93;
        c.invariant_violated = Some("ownership".to_string());
        reactor.react(&mut h, c);
        let stored = h.classification.unwrap();
        assert_eq!(stored.confidence, 0.93);
        assert_eq!(stored.invariant_violated.as_deref(), Some("ownership"));
    }
}
