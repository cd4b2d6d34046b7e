//! Exploration data model
//!
//! A hypothesis carries a testability score measuring how easy it is
//! to test, never how likely it is to be a bug. Its classification
//! field is only ever populated by copying a Truth-Engine response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use vigil_truth::{Classification, ExplorationAction};

use crate::budget::BoundaryStatus;

/// Invariant categories hypotheses can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvariantCategory {
    Authorization,
    Monetary,
    Workflow,
    Trust,
    DataIntegrity,
    SessionManagement,
    InputValidation,
    RateLimiting,
}

impl InvariantCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            InvariantCategory::Authorization => "Authorization",
            InvariantCategory::Monetary => "Monetary",
            InvariantCategory::Workflow => "Workflow",
            InvariantCategory::Trust => "Trust",
            InvariantCategory::DataIntegrity => "DataIntegrity",
            InvariantCategory::SessionManagement => "SessionManagement",
            InvariantCategory::InputValidation => "InputValidation",
            InvariantCategory::RateLimiting => "RateLimiting",
        }
    }
}

impl fmt::Display for InvariantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target description assembled from reconnaissance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Target {
    pub domain: String,
    pub subdomains: Vec<String>,
    pub endpoints: Vec<String>,
    pub technologies: Vec<String>,
    /// Authentication mechanism, when one exists.
    pub authentication: Option<String>,
    pub has_financial_features: bool,
    pub has_workflow_features: bool,
}

impl Target {
    pub fn new(domain: impl Into<String>) -> Self {
        Target {
            domain: domain.into(),
            ..Target::default()
        }
    }
}

/// Lifecycle of one hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HypothesisStatus {
    Untested,
    Testing,
    Submitted,
    Resolved,
}

/// A testable proposition about the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: Uuid,
    pub description: String,
    pub categories: Vec<InvariantCategory>,
    pub test_actions: Vec<ExplorationAction>,
    /// Ease of testing in [0, 1]. Not a confidence.
    pub testability: f64,
    pub status: HypothesisStatus,
    /// Populated only by copying a Truth-Engine response.
    pub classification: Option<Classification>,
    pub created_at: DateTime<Utc>,
    pub tested_at: Option<DateTime<Utc>>,
}

impl Hypothesis {
    pub fn new(
        description: impl Into<String>,
        categories: Vec<InvariantCategory>,
        testability: f64,
    ) -> Self {
        Hypothesis {
            id: Uuid::new_v4(),
            description: description.into(),
            categories,
            test_actions: Vec::new(),
            testability: testability.clamp(0.0, 1.0),
            status: HypothesisStatus::Untested,
            classification: None,
            created_at: Utc::now(),
            tested_at: None,
        }
    }

    /// Adopt the Truth Engine's verdict and mark the hypothesis
    /// resolved. The classification is stored as received.
    pub fn resolve(&mut self, classification: Classification) {
        self.classification = Some(classification);
        self.status = HypothesisStatus::Resolved;
        self.tested_at = Some(Utc::now());
    }

    /// Mark a hypothesis that could not be tested. Untestable does not
    /// mean "not a bug"; no classification is attached.
    pub fn mark_untestable(&mut self) {
        self.status = HypothesisStatus::Resolved;
        self.tested_at = Some(Utc::now());
    }
}

/// Counters for one exploration session.
///
/// `bugs_found` counts Truth-Engine BUG classifications, nothing else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplorationStats {
    pub hypotheses_generated: usize,
    pub hypotheses_tested: usize,
    pub observations_submitted: usize,
    pub bugs_found: usize,
    pub signals_found: usize,
    pub no_issues: usize,
    pub coverage_gaps: usize,
    pub actions_executed: usize,
    pub retries_attempted: usize,
    pub errors_encountered: usize,
}

/// What one session explored.
///
/// An exploration summary, not a coverage report: it never claims
/// completeness, and the Truth Engine's own report stays authoritative
/// for invariant coverage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationSummary {
    pub session_id: Uuid,
    pub target: String,
    pub stats: ExplorationStats,
    pub hypotheses_tested: Vec<Uuid>,
    pub strategies_used: Vec<String>,
    pub boundary_status: BoundaryStatus,
    pub stopped_reason: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
