//! Exploration strategy catalog
//!
//! Strategies are selected from a fixed catalog, never learned. A
//! strategy narrows which hypotheses get attention and may boost their
//! testability ordering; it has no influence on classification.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{Hypothesis, InvariantCategory};

/// Fixed strategy shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Many endpoints, shallowly.
    BreadthFirst,
    /// One path, deeply.
    DepthFirst,
    /// Authorization boundaries first.
    AuthFocused,
    /// Monetary invariants first.
    FinancialFocused,
    /// Workflow invariants first.
    WorkflowFocused,
    /// Follow up on SIGNAL classifications.
    SignalFollow,
}

/// One fixed strategy definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub kind: StrategyKind,
    pub description: String,
    /// Categories this strategy targets; empty means universal.
    pub target_categories: Vec<InvariantCategory>,
    pub max_depth: u32,
    pub max_breadth: u32,
    /// Testability boost for matching hypotheses during ordering.
    pub priority_boost: f64,
}

impl Strategy {
    /// Whether this strategy applies to a hypothesis.
    pub fn matches(&self, hypothesis: &Hypothesis) -> bool {
        if self.target_categories.is_empty() {
            return true;
        }
        hypothesis
            .categories
            .iter()
            .any(|category| self.target_categories.contains(category))
    }
}

/// The fixed strategy catalog.
pub fn strategy_catalog() -> Vec<Strategy> {
    vec![
        Strategy {
            name: "breadth-first".into(),
            kind: StrategyKind::BreadthFirst,
            description: "Touch every endpoint shallowly before going deep".into(),
            target_categories: Vec::new(),
            max_depth: 2,
            max_breadth: 50,
            priority_boost: 0.0,
        },
        Strategy {
            name: "depth-first".into(),
            kind: StrategyKind::DepthFirst,
            description: "Exhaust one path before moving on".into(),
            target_categories: Vec::new(),
            max_depth: 10,
            max_breadth: 5,
            priority_boost: 0.0,
        },
        Strategy {
            name: "auth-focused".into(),
            kind: StrategyKind::AuthFocused,
            description: "Authorization and session boundaries first".into(),
            target_categories: vec![
                InvariantCategory::Authorization,
                InvariantCategory::SessionManagement,
            ],
            max_depth: 5,
            max_breadth: 20,
            priority_boost: 0.15,
        },
        Strategy {
            name: "financial-focused".into(),
            kind: StrategyKind::FinancialFocused,
            description: "Monetary invariants first".into(),
            target_categories: vec![InvariantCategory::Monetary],
            max_depth: 5,
            max_breadth: 20,
            priority_boost: 0.15,
        },
        Strategy {
            name: "workflow-focused".into(),
            kind: StrategyKind::WorkflowFocused,
            description: "Workflow step invariants first".into(),
            target_categories: vec![InvariantCategory::Workflow],
            max_depth: 5,
            max_breadth: 20,
            priority_boost: 0.15,
        },
        Strategy {
            name: "signal-follow".into(),
            kind: StrategyKind::SignalFollow,
            description: "Chase the engine's SIGNAL classifications".into(),
            target_categories: Vec::new(),
            max_depth: 8,
            max_breadth: 10,
            priority_boost: 0.1,
        },
    ]
}

/// Select strategies applicable to a hypothesis set.
pub fn select_strategies<'a>(
    catalog: &'a [Strategy],
    hypotheses: &[Hypothesis],
) -> Vec<&'a Strategy> {
    let selected: Vec<&Strategy> = catalog
        .iter()
        .filter(|strategy| hypotheses.iter().any(|h| strategy.matches(h)))
        .collect();
    info!(count = selected.len(), "strategies selected");
    selected
}

/// Apply a strategy's priority boost to matching hypotheses.
///
/// The boost moves ordering only; the stored score stays an
/// ease-of-test measure clamped to [0, 1].
pub fn apply_boost(strategy: &Strategy, hypotheses: &mut [Hypothesis]) {
    for hypothesis in hypotheses.iter_mut() {
        if strategy.matches(hypothesis) {
            hypothesis.testability =
                (hypothesis.testability + strategy.priority_boost).clamp(0.0, 1.0);
        }
    }
}
