//! VIGIL Exploration Engine
//!
//! Generates testable hypotheses, funnels every observation through
//! the Truth Engine, and reacts to classifications deterministically:
//! - Hypotheses carry ease-of-test, never a likelihood of being a bug
//! - Budgets are shared atomics that never go negative
//! - Feedback rules are fixed: same classification, same reaction
//! - The summary reports what was explored, never coverage
//!
//! When the Truth Engine is unreachable exploration hard-stops; the
//! engine would rather do nothing than guess.

pub mod budget;
pub mod catalog;
pub mod config;
pub mod error;
pub mod explorer;
pub mod feedback;
pub mod hypothesis;
pub mod orchestrator;
pub mod parallel;
pub mod retry;
pub mod strategy;
pub mod types;

pub use budget::{BoundaryStatus, ExplorationBudget, GlobalBudget};
pub use config::{ExplorationConfig, ParallelConfig};
pub use error::{ExploreError, Result};
pub use explorer::{
    AuthBoundary, FinancialAccount, StateExplorer, StateKind, StateTransition, WorkflowProgress,
};
pub use feedback::{CategoryStats, ExplorationAdjustment, FeedbackReactor};
pub use hypothesis::HypothesisGenerator;
pub use orchestrator::Orchestrator;
pub use parallel::{ParallelExplorer, SubmissionCoordinator, WorkerOutcome};
pub use retry::{FailurePattern, RetryManager};
pub use strategy::{strategy_catalog, Strategy, StrategyKind};
pub use types::{
    ExplorationStats, ExplorationSummary, Hypothesis, HypothesisStatus, InvariantCategory, Target,
};
