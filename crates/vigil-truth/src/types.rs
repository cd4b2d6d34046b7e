//! Observation and classification data model
//!
//! Observations carry no verdict of any kind: no classification field,
//! no confidence, no severity. Tool outputs are untrusted signals.
//! Classifications are produced by the Truth Engine and are immutable
//! copies inside the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// What kind of step an exploration action performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    HttpRequest,
    StateMutation,
    ToolExecution,
    Authentication,
    WorkflowStep,
}

/// Outcome of executing an exploration action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionResult {
    Success,
    Failure,
    Timeout,
    Blocked,
    RateLimited,
}

/// One step the explorer performed against a target.
///
/// Captures what was done, never a judgement of what it means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationAction {
    pub id: Uuid,
    pub kind: ActionKind,
    /// Endpoint or object the action touched.
    pub target: String,
    /// Action parameters, keyed deterministically.
    pub parameters: BTreeMap<String, String>,
    pub executed_at: DateTime<Utc>,
    pub result: ActionResult,
    pub error_message: Option<String>,
    pub duration_ms: u64,
}

impl ExplorationAction {
    /// New successful action against a target.
    pub fn new(kind: ActionKind, target: impl Into<String>) -> Self {
        ExplorationAction {
            id: Uuid::new_v4(),
            kind,
            target: target.into(),
            parameters: BTreeMap::new(),
            executed_at: Utc::now(),
            result: ActionResult::Success,
            error_message: None,
            duration_ms: 0,
        }
    }

    /// Attach a parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Output captured from a security tool.
///
/// Untrusted signal: even a tool that claims to have found a
/// vulnerability has produced nothing more than input for the Truth
/// Engine. There is no verdict field here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_name: String,
    pub raw_output: String,
    /// Structured findings parsed from raw output. Still untrusted.
    pub parsed_findings: Vec<BTreeMap<String, String>>,
    pub exit_code: i32,
    pub execution_time_ms: u64,
}

impl ToolOutput {
    pub fn new(tool_name: impl Into<String>, raw_output: impl Into<String>) -> Self {
        ToolOutput {
            tool_name: tool_name.into(),
            raw_output: raw_output.into(),
            parsed_findings: Vec::new(),
            exit_code: 0,
            execution_time_ms: 0,
        }
    }
}

/// What the explorer observed around one action.
///
/// Immutable after creation, and deliberately without a classification
/// field: classification belongs to the Truth Engine alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub id: Uuid,
    pub hypothesis_id: Uuid,
    pub before_state: BTreeMap<String, String>,
    pub action: ExplorationAction,
    pub after_state: BTreeMap<String, String>,
    /// Untrusted signals attached to the observation.
    pub tool_outputs: Vec<ToolOutput>,
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    /// Observation for a hypothesis with empty state captures.
    pub fn new(hypothesis_id: Uuid, action: ExplorationAction) -> Self {
        Observation {
            id: Uuid::new_v4(),
            hypothesis_id,
            before_state: BTreeMap::new(),
            action,
            after_state: BTreeMap::new(),
            tool_outputs: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}

/// The Truth Engine's verdict over one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationKind {
    /// Proven invariant violation.
    Bug,
    /// Interesting but unproven.
    Signal,
    /// Determined not to be an issue.
    NoIssue,
    /// The engine could not validate. Not a finding.
    CoverageGap,
}

/// Classification returned by the Truth Engine.
///
/// Read-only inside the core. The confidence value is the engine's,
/// never recomputed or adjusted locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub observation_id: Uuid,
    pub kind: ClassificationKind,
    /// Which invariant was violated, when `kind` is `Bug`.
    pub invariant_violated: Option<String>,
    /// Proof artifact from the engine, when `kind` is `Bug`.
    pub proof: Option<serde_json::Value>,
    /// Computed by the engine, not by the core.
    pub confidence: f64,
    /// Areas the engine could not validate.
    pub coverage_gaps: Vec<String>,
}

impl Classification {
    pub fn is_bug(&self) -> bool {
        self.kind == ClassificationKind::Bug
    }

    pub fn is_signal(&self) -> bool {
        self.kind == ClassificationKind::Signal
    }

    pub fn is_no_issue(&self) -> bool {
        self.kind == ClassificationKind::NoIssue
    }

    pub fn is_coverage_gap(&self) -> bool {
        self.kind == ClassificationKind::CoverageGap
    }
}

/// Scope verdict from the Truth Engine's rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeValidation {
    pub target: String,
    pub is_in_scope: bool,
    pub reason: String,
    pub warnings: Vec<String>,
}

/// Rate limit status as reported by the Truth Engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateLimitStatus {
    Ok,
    Approaching,
    Exceeded,
    /// The engine cannot determine the status. Not treated as OK.
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_carries_no_verdict() {
        let action = ExplorationAction::new(ActionKind::HttpRequest, "/search");
        let observation = Observation::new(Uuid::new_v4(), action);
        let json = serde_json::to_value(&observation).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert!(!keys.iter().any(|k| k.contains("classification")));
        assert!(!keys.iter().any(|k| k.contains("confidence")));
    }

    #[test]
    fn test_classification_kind_helpers() {
        let classification = Classification {
            observation_id: Uuid::new_v4(),
            kind: ClassificationKind::CoverageGap,
            invariant_violated: None,
            proof: None,
            confidence: 0.0,
            coverage_gaps: vec!["session invariants".to_string()],
        };
        assert!(classification.is_coverage_gap());
        assert!(!classification.is_bug());
    }

    #[test]
    fn test_kind_wire_form() {
        let json = serde_json::to_string(&ClassificationKind::NoIssue).unwrap();
        assert_eq!(json, "\"NO_ISSUE\"");
        let status = serde_json::to_string(&RateLimitStatus::Approaching).unwrap();
        assert_eq!(status, "\"APPROACHING\"");
    }

    #[test]
    fn test_action_parameters_are_ordered() {
        let action = ExplorationAction::new(ActionKind::ToolExecution, "probe")
            .with_parameter("url", "https://example.com")
            .with_parameter("method", "GET");
        let keys: Vec<&String> = action.parameters.keys().collect();
        assert_eq!(keys, vec!["method", "url"]);
    }
}
