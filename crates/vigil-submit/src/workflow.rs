//! Submission workflow state machine
//!
//! State management only: no decision logic, no execution logic, no
//! reasoning about audit contents. Every non-terminal transition
//! consumes a fresh human token; failure is reachable from every state
//! without one. There is no retry and no backoff.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use vigil_audit::{AuditChain, EventKind, Payload};
use vigil_boundary::{BoundaryGuard, ComponentManifest};

use crate::error::{Result, SubmitError};

/// Workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Initialized,
    AwaitingHuman,
    HumanConfirmed,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::Initialized => "INITIALIZED",
            WorkflowStatus::AwaitingHuman => "AWAITING_HUMAN",
            WorkflowStatus::HumanConfirmed => "HUMAN_CONFIRMED",
            WorkflowStatus::Completed => "COMPLETED",
            WorkflowStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether `from -> to` appears in the legal transition table.
///
/// `FAILED` is reachable from every state (fail-closed).
pub fn is_valid_transition(from: WorkflowStatus, to: WorkflowStatus) -> bool {
    if to == WorkflowStatus::Failed {
        return true;
    }
    matches!(
        (from, to),
        (WorkflowStatus::Initialized, WorkflowStatus::AwaitingHuman)
            | (WorkflowStatus::AwaitingHuman, WorkflowStatus::HumanConfirmed)
            | (WorkflowStatus::HumanConfirmed, WorkflowStatus::Completed)
    )
}

/// Single-use token proving a human authorized one transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanToken {
    pub token_id: Uuid,
    pub issued_by: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub signature: String,
}

impl HumanToken {
    /// Expected signature prefix.
    pub const SIGNATURE_PREFIX: &'static str = "HC-";
    /// Minimum signature length including the prefix.
    pub const SIGNATURE_MIN_LEN: usize = 12;
    /// Token validity window.
    pub const TTL_SECONDS: i64 = 900;

    /// Issue a fresh token on behalf of a named human.
    pub fn issue(issued_by: &str) -> Self {
        let token_id = Uuid::new_v4();
        let issued_at = Utc::now();
        HumanToken {
            token_id,
            issued_by: issued_by.to_string(),
            issued_at,
            expires_at: issued_at + Duration::seconds(Self::TTL_SECONDS),
            signature: format!("{}{}", Self::SIGNATURE_PREFIX, token_id.simple()),
        }
    }

    /// Format check only; semantic validity is the machine's used-set
    /// and expiry check.
    pub fn signature_well_formed(&self) -> bool {
        self.signature.starts_with(Self::SIGNATURE_PREFIX)
            && self.signature.len() >= Self::SIGNATURE_MIN_LEN
    }
}

/// One submission's workflow instance.
pub struct SubmissionWorkflow {
    workflow_id: Uuid,
    chain: Arc<AuditChain>,
    status: Mutex<WorkflowStatus>,
    used_tokens: Mutex<HashSet<Uuid>>,
}

impl SubmissionWorkflow {
    /// Create a workflow in `INITIALIZED`, admitted by the guard.
    pub fn create(guard: &BoundaryGuard, chain: Arc<AuditChain>, actor: &str) -> Result<Self> {
        let manifest = ComponentManifest::new("submission_workflow")
            .with_method("transition")
            .with_method("status")
            .with_method("fail");
        guard.admit(&manifest)?;
        let workflow_id = Uuid::new_v4();
        chain.append(
            EventKind::WorkflowCreated,
            actor,
            Payload::new().with("workflow_id", workflow_id.to_string()),
        );
        Ok(SubmissionWorkflow {
            workflow_id,
            chain,
            status: Mutex::new(WorkflowStatus::Initialized),
            used_tokens: Mutex::new(HashSet::new()),
        })
    }

    pub fn workflow_id(&self) -> Uuid {
        self.workflow_id
    }

    pub fn status(&self) -> WorkflowStatus {
        *self.status.lock()
    }

    /// Transition to a new state.
    ///
    /// Non-terminal transitions require a fresh, unexpired,
    /// well-formed token, consumed on success. Completion is
    /// idempotent. Transitioning to `FAILED` needs no token and is
    /// legal from every state.
    pub fn transition(
        &self,
        to: WorkflowStatus,
        token: Option<&HumanToken>,
        actor: &str,
    ) -> Result<WorkflowStatus> {
        let mut status = self.status.lock();
        let from = *status;

        if to == WorkflowStatus::Completed && from == WorkflowStatus::Completed {
            return Ok(from);
        }

        if !is_valid_transition(from, to) {
            return Err(SubmitError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }

        if to != WorkflowStatus::Failed {
            let token = token.ok_or_else(|| SubmitError::TokenFormat {
                detail: "human confirmation token required for non-terminal transition"
                    .to_string(),
            })?;
            self.validate_and_consume(token)?;
        }

        *status = to;
        drop(status);

        info!(workflow_id = %self.workflow_id, %from, %to, "workflow transition");
        self.chain.append(
            EventKind::WorkflowTransition,
            actor,
            Payload::new()
                .with("workflow_id", self.workflow_id.to_string())
                .with("from", from.as_str())
                .with("to", to.as_str()),
        );
        Ok(to)
    }

    /// Fail the workflow. Always permitted, never needs a token.
    pub fn fail(&self, actor: &str, reason: &str) -> WorkflowStatus {
        let mut status = self.status.lock();
        let from = *status;
        *status = WorkflowStatus::Failed;
        drop(status);

        self.chain.append(
            EventKind::WorkflowTransition,
            actor,
            Payload::new()
                .with("workflow_id", self.workflow_id.to_string())
                .with("from", from.as_str())
                .with("to", WorkflowStatus::Failed.as_str())
                .with("reason", reason),
        );
        WorkflowStatus::Failed
    }

    fn validate_and_consume(&self, token: &HumanToken) -> Result<()> {
        if !token.signature_well_formed() {
            return Err(SubmitError::TokenFormat {
                detail: format!("signature `{}` is not in the expected format", token.signature),
            });
        }
        if Utc::now() > token.expires_at {
            return Err(SubmitError::TokenExpired {
                confirmation_id: token.token_id,
                expired_at: token.expires_at,
            });
        }
        let mut used = self.used_tokens.lock();
        if !used.insert(token.token_id) {
            return Err(SubmitError::TokenAlreadyUsed {
                confirmation_id: token.token_id,
            });
        }
        Ok(())
    }
}
