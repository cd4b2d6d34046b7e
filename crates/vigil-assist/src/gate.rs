//! Human confirmation gate
//!
//! The final gate before any assistant output is acted upon. Every
//! output enters as pending; the human answers YES or NO, one output
//! at a time. Nothing expires into approval, nothing is confirmed in
//! batch, and nothing bypasses the gate.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::info;
use uuid::Uuid;

use vigil_boundary::{AdvisoryStamp, BoundaryGuard, ComponentManifest};

use crate::error::{AssistError, Result};

/// Bound on the pending-output set; oldest evicted when full.
const MAX_PENDING: usize = 1_000;
/// Pending outputs older than this are swept away, never approved.
const PENDING_EXPIRY_HOURS: i64 = 24;

/// Where one output stands with the human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
    Rejected,
}

/// An assistant output awaiting the human's answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantOutput {
    pub output_id: Uuid,
    /// What kind of output this is (hint, draft, warning, ...).
    pub output_kind: String,
    /// Rendered content the human reviews.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub status: ConfirmationStatus,
    pub stamp: AdvisoryStamp,
}

/// The human's recorded YES or NO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanConfirmation {
    pub confirmation_id: Uuid,
    pub output_id: Uuid,
    pub output_kind: String,
    pub status: ConfirmationStatus,
    pub confirmed_by: String,
    pub confirmed_at: DateTime<Utc>,
    /// Always true: this record exists because a human clicked.
    pub is_explicit_human_action: bool,
}

struct GateInner {
    pending: VecDeque<AssistantOutput>,
    confirmations: HashMap<Uuid, HumanConfirmation>,
}

/// Wraps every emitted output in a pending record.
pub struct HumanGate {
    inner: Mutex<GateInner>,
}

impl HumanGate {
    /// Construct the gate, presenting its manifest to the guard.
    pub fn new(guard: &BoundaryGuard) -> Result<Self> {
        let manifest = ComponentManifest::new("human_gate")
            .with_method("register_output")
            .with_method("confirm");
        guard.admit(&manifest)?;
        Ok(HumanGate {
            inner: Mutex::new(GateInner {
                pending: VecDeque::new(),
                confirmations: HashMap::new(),
            }),
        })
    }

    /// Register an output; it stays pending until the human answers.
    pub fn register_output(&self, output_kind: &str, content: &str) -> AssistantOutput {
        let output = AssistantOutput {
            output_id: Uuid::new_v4(),
            output_kind: output_kind.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
            status: ConfirmationStatus::Pending,
            stamp: AdvisoryStamp::new(),
        };

        let mut inner = self.inner.lock();
        if inner.pending.len() >= MAX_PENDING {
            inner.pending.pop_front();
        }
        inner.pending.push_back(output.clone());
        output
    }

    /// Record the human's YES or NO for one output.
    pub fn confirm(&self, output_id: Uuid, confirmed_by: &str, approved: bool)
        -> Result<HumanConfirmation>
    {
        let mut inner = self.inner.lock();
        let position = inner
            .pending
            .iter()
            .position(|output| output.output_id == output_id)
            .ok_or_else(|| AssistError::UnknownOutput {
                output_id: output_id.to_string(),
            })?;
        let output = inner.pending.remove(position).expect("position just found");

        let status = if approved {
            ConfirmationStatus::Confirmed
        } else {
            ConfirmationStatus::Rejected
        };
        let confirmation = HumanConfirmation {
            confirmation_id: Uuid::new_v4(),
            output_id,
            output_kind: output.output_kind.clone(),
            status,
            confirmed_by: confirmed_by.to_string(),
            confirmed_at: Utc::now(),
            is_explicit_human_action: true,
        };
        inner
            .confirmations
            .insert(confirmation.confirmation_id, confirmation.clone());
        info!(%output_id, approved, "human answered");
        Ok(confirmation)
    }

    /// Whether the human answered YES for an output.
    pub fn is_confirmed(&self, output_id: Uuid) -> bool {
        self.inner
            .lock()
            .confirmations
            .values()
            .any(|c| c.output_id == output_id && c.status == ConfirmationStatus::Confirmed)
    }

    /// Whether the human answered NO for an output.
    pub fn is_rejected(&self, output_id: Uuid) -> bool {
        self.inner
            .lock()
            .confirmations
            .values()
            .any(|c| c.output_id == output_id && c.status == ConfirmationStatus::Rejected)
    }

    /// Whether an output still awaits an answer.
    pub fn is_pending(&self, output_id: Uuid) -> bool {
        self.inner
            .lock()
            .pending
            .iter()
            .any(|output| output.output_id == output_id)
    }

    /// All outputs still awaiting an answer.
    pub fn pending_outputs(&self) -> Vec<AssistantOutput> {
        self.inner.lock().pending.iter().cloned().collect()
    }

    /// Look up one recorded confirmation.
    pub fn confirmation(&self, confirmation_id: Uuid) -> Option<HumanConfirmation> {
        self.inner.lock().confirmations.get(&confirmation_id).cloned()
    }

    /// Sweep expired pending outputs. Expiry removes; it never approves.
    pub fn expire_old_pending(&self) -> usize {
        let cutoff = Utc::now() - Duration::hours(PENDING_EXPIRY_HOURS);
        let mut inner = self.inner.lock();
        let before = inner.pending.len();
        inner.pending.retain(|output| output.created_at >= cutoff);
        before - inner.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_starts_pending_and_stamped() {
        let gate = HumanGate::new(&BoundaryGuard::default()).unwrap();
        let output = gate.register_output("duplicate_hint", "looks similar to F-1");
        assert_eq!(output.status, ConfirmationStatus::Pending);
        assert!(gate.is_pending(output.output_id));
        assert!(output.stamp.human_confirmation_required);
        assert!(output.stamp.no_auto_action);
    }

    #[test]
    fn test_yes_answer_confirms() {
        let gate = HumanGate::new(&BoundaryGuard::default()).unwrap();
        let output = gate.register_output("draft", "draft body");
        let confirmation = gate.confirm(output.output_id, "alice", true).unwrap();
        assert_eq!(confirmation.status, ConfirmationStatus::Confirmed);
        assert!(confirmation.is_explicit_human_action);
        assert!(gate.is_confirmed(output.output_id));
        assert!(!gate.is_pending(output.output_id));
        assert_eq!(
            gate.confirmation(confirmation.confirmation_id)
                .unwrap()
                .confirmed_by,
            "alice"
        );
    }

    #[test]
    fn test_no_answer_rejects() {
        let gate = HumanGate::new(&BoundaryGuard::default()).unwrap();
        let output = gate.register_output("scope_warning", "outside scope?");
        gate.confirm(output.output_id, "alice", false).unwrap();
        assert!(gate.is_rejected(output.output_id));
        assert!(!gate.is_confirmed(output.output_id));
    }

    #[test]
    fn test_unknown_output_refused() {
        let gate = HumanGate::new(&BoundaryGuard::default()).unwrap();
        let err = gate.confirm(Uuid::new_v4(), "alice", true).unwrap_err();
        assert!(matches!(err, AssistError::UnknownOutput { .. }));
    }

    #[test]
    fn test_pending_set_is_bounded() {
        let gate = HumanGate::new(&BoundaryGuard::default()).unwrap();
        let first = gate.register_output("hint", "first");
        for n in 0..MAX_PENDING {
            gate.register_output("hint", &format!("output {n}"));
        }
        // The oldest pending output was evicted, never auto-approved.
        assert!(!gate.is_pending(first.output_id));
        assert!(!gate.is_confirmed(first.output_id));
        assert_eq!(gate.pending_outputs().len(), MAX_PENDING);
    }

    #[test]
    fn test_expiry_removes_without_approving() {
        let gate = HumanGate::new(&BoundaryGuard::default()).unwrap();
        let output = gate.register_output("hint", "stale");
        {
            let mut inner = gate.inner.lock();
            inner.pending[0].created_at = Utc::now() - Duration::hours(25);
        }
        assert_eq!(gate.expire_old_pending(), 1);
        assert!(!gate.is_pending(output.output_id));
        assert!(!gate.is_confirmed(output.output_id));
        assert!(!gate.is_rejected(output.output_id));
    }

    #[test]
    fn test_each_confirmation_is_single_output() {
        let gate = HumanGate::new(&BoundaryGuard::default()).unwrap();
        let a = gate.register_output("hint", "a");
        let b = gate.register_output("hint", "b");
        gate.confirm(a.output_id, "alice", true).unwrap();
        // Confirming one output leaves the other untouched.
        assert!(gate.is_pending(b.output_id));
    }
}
