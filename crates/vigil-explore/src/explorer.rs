//! State-space exploration
//!
//! Enumerates state transitions worth observing: cross-role access,
//! financial state changes, workflow step manipulation. Everything
//! produced here is an observation for the Truth Engine; a state
//! change is untrusted until the engine has judged it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use vigil_truth::{
    ActionKind, Classification, ExplorationAction, Observation, TruthClient,
};

use crate::error::Result;
use crate::types::Hypothesis;

/// Kind of state being explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateKind {
    Authentication,
    Authorization,
    Financial,
    Workflow,
    Session,
    Data,
}

/// One state transition queued for observation.
///
/// An observation target, never a finding; there is no violation flag
/// because violations are the Truth Engine's call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub id: String,
    pub kind: StateKind,
    pub from_state: BTreeMap<String, String>,
    pub to_state: BTreeMap<String, String>,
    pub action: ExplorationAction,
    pub timestamp: DateTime<Utc>,
}

/// An authentication/authorization boundary to probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthBoundary {
    pub name: String,
    pub roles: Vec<String>,
    pub endpoints: Vec<String>,
}

/// A financial account state to probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialAccount {
    pub account_id: String,
    pub balance: f64,
    pub currency: String,
    pub pending_transactions: usize,
}

/// A workflow's progress state to probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowProgress {
    pub workflow_id: String,
    pub current_step: u32,
    pub total_steps: u32,
    pub completed_steps: Vec<u32>,
    pub required_order: bool,
}

/// Generates observations over a target's state space.
pub struct StateExplorer<'a> {
    client: &'a TruthClient,
    explored: HashSet<String>,
    transitions: Vec<StateTransition>,
}

impl<'a> StateExplorer<'a> {
    pub fn new(client: &'a TruthClient) -> Self {
        StateExplorer {
            client,
            explored: HashSet::new(),
            transitions: Vec::new(),
        }
    }

    /// Enumerate transitions from an initial state over candidate
    /// actions. The `to_state` of each stays empty until the action is
    /// actually executed.
    pub fn enumerate_transitions(
        &self,
        initial_state: &BTreeMap<String, String>,
        actions: Vec<ExplorationAction>,
    ) -> Vec<StateTransition> {
        let transitions: Vec<StateTransition> = actions
            .into_iter()
            .enumerate()
            .map(|(index, action)| StateTransition {
                id: format!("trans-{index}"),
                kind: StateKind::Data,
                from_state: initial_state.clone(),
                to_state: BTreeMap::new(),
                action,
                timestamp: Utc::now(),
            })
            .collect();
        info!(count = transitions.len(), "transitions enumerated");
        transitions
    }

    /// Cross-role access observations for every boundary.
    ///
    /// Every (role, other role, endpoint) combination yields one
    /// observation for the engine to judge.
    pub fn explore_auth_boundaries(
        &self,
        boundaries: &[AuthBoundary],
        hypothesis: &Hypothesis,
    ) -> Vec<Observation> {
        let mut observations = Vec::new();
        for boundary in boundaries {
            for acting_role in &boundary.roles {
                for endpoint in &boundary.endpoints {
                    for target_role in &boundary.roles {
                        if target_role == acting_role {
                            continue;
                        }
                        let mut observation = Observation::new(
                            hypothesis.id,
                            ExplorationAction::new(ActionKind::Authentication, endpoint)
                                .with_parameter("acting_as", acting_role)
                                .with_parameter("accessing_as", target_role),
                        );
                        observation
                            .before_state
                            .insert("acting_role".into(), acting_role.clone());
                        observation
                            .before_state
                            .insert("target_role".into(), target_role.clone());
                        observation
                            .before_state
                            .insert("boundary".into(), boundary.name.clone());
                        observations.push(observation);
                    }
                }
            }
        }
        info!(count = observations.len(), "auth boundary observations generated");
        observations
    }

    /// Balance and double-spend observations for account states.
    pub fn explore_financial_states(
        &self,
        accounts: &[FinancialAccount],
        hypothesis: &Hypothesis,
    ) -> Vec<Observation> {
        let mut observations = Vec::new();
        for account in accounts {
            observations.push(financial_observation(hypothesis, account, "balance_check"));
            if account.pending_transactions > 0 {
                observations.push(financial_observation(
                    hypothesis,
                    account,
                    "double_spend_check",
                ));
            }
        }
        info!(count = observations.len(), "financial state observations generated");
        observations
    }

    /// Step-skip and step-replay observations for workflow states.
    pub fn explore_workflow_states(
        &self,
        workflows: &[WorkflowProgress],
        hypothesis: &Hypothesis,
    ) -> Vec<Observation> {
        let mut observations = Vec::new();
        for workflow in workflows {
            if workflow.required_order && workflow.current_step < workflow.total_steps {
                observations.push(workflow_observation(
                    hypothesis,
                    workflow,
                    "skip_step",
                    workflow.current_step + 2,
                ));
            }
            if let Some(&first_completed) = workflow.completed_steps.first() {
                observations.push(workflow_observation(
                    hypothesis,
                    workflow,
                    "replay_step",
                    first_completed,
                ));
            }
        }
        info!(count = observations.len(), "workflow state observations generated");
        observations
    }

    /// Submit a batch of observations for classification.
    ///
    /// The only way a state change gets judged; the explorer holds no
    /// opinion about any of them.
    pub fn submit_observations(
        &self,
        observations: &[Observation],
    ) -> Result<Vec<Classification>> {
        let mut classifications = Vec::new();
        for observation in observations {
            let classification = self.client.submit_observation(observation)?;
            debug!(
                observation_id = %observation.id,
                kind = ?classification.kind,
                "state observation classified"
            );
            classifications.push(classification);
        }
        Ok(classifications)
    }

    /// Record an executed transition for bookkeeping.
    pub fn record_transition(&mut self, transition: StateTransition) {
        let key = format!("{:?}->{:?}", transition.from_state, transition.to_state);
        self.explored.insert(key);
        self.transitions.push(transition);
    }

    /// Number of distinct explored transitions.
    pub fn explored_count(&self) -> usize {
        self.explored.len()
    }

    /// Every recorded transition, in order.
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }
}

fn financial_observation(
    hypothesis: &Hypothesis,
    account: &FinancialAccount,
    operation: &str,
) -> Observation {
    let mut observation = Observation::new(
        hypothesis.id,
        ExplorationAction::new(
            ActionKind::StateMutation,
            format!("account:{}", account.account_id),
        )
        .with_parameter("operation", operation),
    );
    observation
        .before_state
        .insert("account_id".into(), account.account_id.clone());
    observation
        .before_state
        .insert("balance".into(), account.balance.to_string());
    observation
        .before_state
        .insert("currency".into(), account.currency.clone());
    observation.before_state.insert(
        "pending_count".into(),
        account.pending_transactions.to_string(),
    );
    observation
}

fn workflow_observation(
    hypothesis: &Hypothesis,
    workflow: &WorkflowProgress,
    operation: &str,
    target_step: u32,
) -> Observation {
    let mut observation = Observation::new(
        hypothesis.id,
        ExplorationAction::new(
            ActionKind::WorkflowStep,
            format!("workflow:{}", workflow.workflow_id),
        )
        .with_parameter("operation", operation)
        .with_parameter("target_step", target_step.to_string()),
    );
    observation
        .before_state
        .insert("workflow_id".into(), workflow.workflow_id.clone());
    observation
        .before_state
        .insert("current_step".into(), workflow.current_step.to_string());
    observation
        .before_state
        .insert("total_steps".into(), workflow.total_steps.to_string());
    observation
}
