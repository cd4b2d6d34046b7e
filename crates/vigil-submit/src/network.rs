//! Network transmit manager
//!
//! The only place in the pipeline where the network exists. The
//! enabled flag is raised for exactly one adapter call under a consumed
//! confirmation whose hash matches the draft, and is lowered on every
//! exit path. Tampering means the adapter is never called. There are
//! no retries here; a retry is a new human confirmation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use vigil_audit::{AuditChain, EventKind, Payload};
use vigil_boundary::{BoundaryGuard, Capability, CapabilityToken, ComponentManifest};

use crate::adapter::PlatformAdapter;
use crate::confirmation::{ConfirmationRegistry, SubmissionConfirmation};
use crate::draft::{DraftReport, Platform};
use crate::duplicate::DuplicateGuard;
use crate::error::{Result, SubmitError};

/// Terminal status of one transmission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Submitted,
    Failed,
}

/// Record returned by `transmit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub record_id: Uuid,
    pub request_id: Uuid,
    pub confirmation_id: Uuid,
    pub platform: Platform,
    pub platform_submission_id: Option<String>,
    pub platform_response: String,
    pub status: SubmissionStatus,
    pub transmitted_at: DateTime<Utc>,
}

/// True when the confirmation's hash matches the draft's current bytes.
pub fn verify_report_integrity(
    confirmation: &SubmissionConfirmation,
    draft: &DraftReport,
) -> bool {
    confirmation.report_hash == draft.report_hash()
}

/// Lowers the network-enabled flag on every exit path.
struct NetworkWindow<'a> {
    flag: &'a AtomicBool,
}

impl<'a> NetworkWindow<'a> {
    fn open(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        NetworkWindow { flag }
    }
}

impl Drop for NetworkWindow<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Performs the single gated transmission.
pub struct NetworkTransmitManager {
    boundary: BoundaryGuard,
    transmit_token: CapabilityToken,
    chain: Arc<AuditChain>,
    registry: Arc<ConfirmationRegistry>,
    duplicate_guard: Arc<DuplicateGuard>,
    network_enabled: AtomicBool,
}

impl NetworkTransmitManager {
    /// Construct the manager, presenting its manifest to the guard.
    ///
    /// Admission also mints the transmit capability; every `transmit`
    /// call re-checks it against the guard.
    pub fn new(
        guard: &BoundaryGuard,
        chain: Arc<AuditChain>,
        registry: Arc<ConfirmationRegistry>,
        duplicate_guard: Arc<DuplicateGuard>,
    ) -> Result<Self> {
        let manifest = ComponentManifest::new("network_transmit_manager")
            .with_method("transmit")
            .with_method("is_network_enabled");
        guard.admit(&manifest)?;
        let transmit_token = guard.grant(Capability::TransmitReport, "network_transmit_manager");
        Ok(NetworkTransmitManager {
            boundary: guard.clone(),
            transmit_token,
            chain,
            registry,
            duplicate_guard,
            network_enabled: AtomicBool::new(false),
        })
    }

    /// Whether the network window is currently open.
    pub fn is_network_enabled(&self) -> bool {
        self.network_enabled.load(Ordering::SeqCst)
    }

    /// Transmit one confirmed draft through one adapter call.
    ///
    /// In order: consume the confirmation, verify the report hash,
    /// acquire the duplicate key when a decision id is given, open the
    /// network window, call the adapter once, record the outcome, and
    /// release everything. Adapter failure is local: the confirmation
    /// stays consumed and a `Failed` record is returned.
    pub fn transmit(
        &self,
        confirmation: &SubmissionConfirmation,
        draft: &DraftReport,
        adapter: &mut dyn PlatformAdapter,
        submitter_id: &str,
        decision_id: Option<&str>,
    ) -> Result<SubmissionRecord> {
        self.boundary
            .require(&self.transmit_token, Capability::TransmitReport, "transmit")?;
        let consumed = self.registry.consume(confirmation.confirmation_id)?;

        let actual_hash = draft.report_hash();
        if consumed.report_hash != actual_hash {
            error!(
                confirmation_id = %confirmation.confirmation_id,
                "report tampering detected; network stays disabled"
            );
            self.chain.append(
                EventKind::ReportTamperingDetected,
                submitter_id,
                Payload::new()
                    .with("confirmation_id", confirmation.confirmation_id.to_string())
                    .with("expected_hash", consumed.report_hash.clone())
                    .with("actual_hash", actual_hash.clone())
                    .with("error_type", "ReportTampering"),
            );
            return Err(SubmitError::ReportTampering {
                confirmation_id: confirmation.confirmation_id,
                expected_hash: consumed.report_hash,
                actual_hash,
            });
        }

        let platform = adapter.platform();
        let key = match decision_id {
            Some(decision_id) => Some(self.duplicate_guard.check_and_acquire(
                decision_id,
                platform,
                submitter_id,
            )?),
            None => None,
        };

        self.chain.append(
            EventKind::NetworkAccessGranted,
            submitter_id,
            Payload::new()
                .with("confirmation_id", confirmation.confirmation_id.to_string())
                .with("request_id", consumed.request_id.to_string())
                .with("platform", platform.as_str()),
        );
        info!(platform = %platform, "network window opened for one transmission");

        let outcome = {
            let _window = NetworkWindow::open(&self.network_enabled);
            adapter.submit(draft)
        };

        let record = match outcome {
            Ok((platform_submission_id, response)) => {
                let mut payload = Payload::new()
                    .with("platform", platform.as_str())
                    .with("platform_submission_id", platform_submission_id.clone());
                if let Some(decision_id) = decision_id {
                    payload = payload.with("decision_id", decision_id);
                }
                self.chain
                    .append(EventKind::Transmitted, submitter_id, payload);
                SubmissionRecord {
                    record_id: Uuid::new_v4(),
                    request_id: consumed.request_id,
                    confirmation_id: consumed.confirmation_id,
                    platform,
                    platform_submission_id: Some(platform_submission_id),
                    platform_response: response,
                    status: SubmissionStatus::Submitted,
                    transmitted_at: Utc::now(),
                }
            }
            Err(e) => {
                warn!(platform = %platform, error = %e, "transmission failed");
                self.chain.append(
                    EventKind::TransmissionFailed,
                    submitter_id,
                    Payload::new()
                        .with("platform", platform.as_str())
                        .with("error_kind", error_kind(&e))
                        .with("error_message", e.to_string()),
                );
                SubmissionRecord {
                    record_id: Uuid::new_v4(),
                    request_id: consumed.request_id,
                    confirmation_id: consumed.confirmation_id,
                    platform,
                    platform_submission_id: None,
                    platform_response: e.to_string(),
                    status: SubmissionStatus::Failed,
                    transmitted_at: Utc::now(),
                }
            }
        };

        if let Some(key) = key {
            self.duplicate_guard
                .verify_and_release(&key, record.status == SubmissionStatus::Submitted);
        }
        Ok(record)
    }
}

fn error_kind(error: &SubmitError) -> &'static str {
    match error {
        SubmitError::AdapterViolation { .. } => "adapter_multiple_requests",
        SubmitError::PlatformFailure { .. } => "platform_failure",
        SubmitError::ReportTampering { .. } => "report_tampering",
        SubmitError::TokenAlreadyUsed { .. } => "token_already_used",
        SubmitError::TokenExpired { .. } => "token_expired",
        SubmitError::UnknownConfirmation { .. } => "unknown_confirmation",
        SubmitError::TokenFormat { .. } => "token_format",
        SubmitError::DuplicateSubmission { .. } => "duplicate_submission",
        SubmitError::InvalidTransition { .. } => "invalid_transition",
        SubmitError::Boundary(_) => "boundary_violation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{CountingAdapter, RequestCounter};
    use crate::config::SubmissionConfig;

    struct StubAdapter {
        counter: RequestCounter,
        platform: Platform,
        fail_with: Option<String>,
        requests_per_submit: u32,
        submit_calls: u32,
        response: (String, String),
    }

    impl StubAdapter {
        fn accepting(platform_id: &str) -> Self {
            StubAdapter {
                counter: RequestCounter::new(),
                platform: Platform::HackerOne,
                fail_with: None,
                requests_per_submit: 1,
                submit_calls: 0,
                response: (platform_id.to_string(), "accepted".to_string()),
            }
        }

        fn failing(message: &str) -> Self {
            let mut adapter = Self::accepting("unused");
            adapter.fail_with = Some(message.to_string());
            adapter
        }
    }

    impl CountingAdapter for StubAdapter {
        fn platform(&self) -> Platform {
            self.platform
        }

        fn counter(&mut self) -> &mut RequestCounter {
            &mut self.counter
        }

        fn perform_submit(&mut self, _draft: &DraftReport) -> Result<(String, String)> {
            self.submit_calls += 1;
            for _ in 0..self.requests_per_submit {
                self.counter.check_and_increment()?;
            }
            if let Some(message) = &self.fail_with {
                return Err(SubmitError::PlatformFailure {
                    platform: self.platform,
                    detail: message.clone(),
                });
            }
            Ok(self.response.clone())
        }
    }

    struct Fixture {
        chain: Arc<AuditChain>,
        registry: Arc<ConfirmationRegistry>,
        manager: NetworkTransmitManager,
    }

    fn fixture() -> Fixture {
        let guard = BoundaryGuard::default();
        let chain = Arc::new(AuditChain::new(&guard).unwrap());
        let registry = Arc::new(
            ConfirmationRegistry::new(&guard, Arc::clone(&chain), &SubmissionConfig::default())
                .unwrap(),
        );
        let duplicate_guard = Arc::new(DuplicateGuard::new(&guard, Arc::clone(&chain)).unwrap());
        let manager = NetworkTransmitManager::new(
            &guard,
            Arc::clone(&chain),
            Arc::clone(&registry),
            duplicate_guard,
        )
        .unwrap();
        Fixture {
            chain,
            registry,
            manager,
        }
    }

    fn sample_draft() -> DraftReport {
        DraftReport::new("XSS in /search", "reflected", "HIGH", "XSS")
    }

    #[test]
    fn test_network_disabled_by_default() {
        let fixture = fixture();
        assert!(!fixture.manager.is_network_enabled());
    }

    #[test]
    fn test_happy_submission_event_order() {
        let fixture = fixture();
        let draft = sample_draft();
        let confirmation = fixture
            .registry
            .issue(draft.request_id, "alice", &draft.report_hash());
        let mut adapter = StubAdapter::accepting("PLAT-42");

        let record = fixture
            .manager
            .transmit(&confirmation, &draft, &mut adapter, "alice", Some("D1"))
            .unwrap();

        assert_eq!(record.status, SubmissionStatus::Submitted);
        assert_eq!(record.platform_submission_id.as_deref(), Some("PLAT-42"));
        assert_eq!(record.request_id, draft.request_id);
        assert!(!fixture.manager.is_network_enabled());

        let kinds: Vec<EventKind> = fixture
            .chain
            .snapshot()
            .iter()
            .map(|e| e.event_kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::ConfirmationIssued,
                EventKind::ConfirmationConsumed,
                EventKind::NetworkAccessGranted,
                EventKind::Transmitted,
            ]
        );
        assert!(fixture.chain.verify().ok);
    }

    #[test]
    fn test_tampered_title_blocks_network() {
        let fixture = fixture();
        let mut draft = sample_draft();
        let confirmation = fixture
            .registry
            .issue(draft.request_id, "alice", &draft.report_hash());
        let original_hash = draft.report_hash();

        draft.title = "XSS in /search (edited)".to_string();
        let mut adapter = StubAdapter::accepting("PLAT-42");

        let err = fixture
            .manager
            .transmit(&confirmation, &draft, &mut adapter, "alice", None)
            .unwrap_err();
        match err {
            SubmitError::ReportTampering {
                expected_hash,
                actual_hash,
                ..
            } => {
                assert_eq!(expected_hash, original_hash);
                assert_eq!(actual_hash, draft.report_hash());
            }
            other => panic!("expected tampering, got {other:?}"),
        }

        // Adapter never called; flag false throughout.
        assert_eq!(adapter.submit_calls, 0);
        assert!(!fixture.manager.is_network_enabled());

        let kinds: Vec<EventKind> = fixture
            .chain
            .snapshot()
            .iter()
            .map(|e| e.event_kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::ConfirmationIssued,
                EventKind::ConfirmationConsumed,
                EventKind::ReportTamperingDetected,
            ]
        );
        assert!(!kinds.contains(&EventKind::NetworkAccessGranted));
    }

    #[test]
    fn test_replay_refused_without_new_grant() {
        let fixture = fixture();
        let draft = sample_draft();
        let confirmation = fixture
            .registry
            .issue(draft.request_id, "alice", &draft.report_hash());
        let mut adapter = StubAdapter::accepting("PLAT-42");

        fixture
            .manager
            .transmit(&confirmation, &draft, &mut adapter, "alice", Some("D1"))
            .unwrap();
        let grants_before = fixture
            .chain
            .entries_of_kind(EventKind::NetworkAccessGranted)
            .len();

        let err = fixture
            .manager
            .transmit(&confirmation, &draft, &mut adapter, "alice", Some("D1"))
            .unwrap_err();
        assert!(matches!(err, SubmitError::TokenAlreadyUsed { .. }));
        assert_eq!(
            fixture
                .chain
                .entries_of_kind(EventKind::NetworkAccessGranted)
                .len(),
            grants_before
        );
    }

    #[test]
    fn test_failed_transmission_consumes_confirmation() {
        let fixture = fixture();
        let draft = sample_draft();
        let confirmation = fixture
            .registry
            .issue(draft.request_id, "alice", &draft.report_hash());
        let mut adapter = StubAdapter::failing("Platform down");

        let record = fixture
            .manager
            .transmit(&confirmation, &draft, &mut adapter, "alice", None)
            .unwrap();
        assert_eq!(record.status, SubmissionStatus::Failed);
        assert!(fixture.registry.is_used(confirmation.confirmation_id));
        assert!(!fixture.manager.is_network_enabled());

        let failed = fixture.chain.entries_of_kind(EventKind::TransmissionFailed);
        assert_eq!(failed.len(), 1);
        assert!(failed[0]
            .payload
            .get("error_message")
            .unwrap()
            .contains("Platform down"));
    }

    #[test]
    fn test_adapter_over_count_recorded_as_failure() {
        let fixture = fixture();
        let draft = sample_draft();
        let confirmation = fixture
            .registry
            .issue(draft.request_id, "alice", &draft.report_hash());
        let mut adapter = StubAdapter::accepting("PLAT-42");
        adapter.requests_per_submit = 2;

        let record = fixture
            .manager
            .transmit(&confirmation, &draft, &mut adapter, "alice", None)
            .unwrap();
        assert_eq!(record.status, SubmissionStatus::Failed);
        assert!(record.platform_response.contains("adapter_multiple_requests"));

        let failed = fixture.chain.entries_of_kind(EventKind::TransmissionFailed);
        assert_eq!(
            failed[0].payload.get("error_kind"),
            Some("adapter_multiple_requests")
        );
    }

    #[test]
    fn test_duplicate_race_exactly_one_transmitted() {
        let fixture = fixture();
        let manager = Arc::new(fixture.manager);
        let barrier = Arc::new(std::sync::Barrier::new(2));

        let drafts: Vec<DraftReport> = (0..2).map(|_| sample_draft()).collect();
        let confirmations: Vec<SubmissionConfirmation> = drafts
            .iter()
            .map(|d| fixture.registry.issue(d.request_id, "alice", &d.report_hash()))
            .collect();

        let mut submitted = 0;
        let mut duplicates = 0;
        std::thread::scope(|scope| {
            let handles: Vec<_> = drafts
                .iter()
                .zip(confirmations.iter())
                .map(|(draft, confirmation)| {
                    let manager = Arc::clone(&manager);
                    let barrier = Arc::clone(&barrier);
                    scope.spawn(move || {
                        let mut adapter = StubAdapter::accepting("PLAT-RACE");
                        barrier.wait();
                        manager.transmit(confirmation, draft, &mut adapter, "alice", Some("D2"))
                    })
                })
                .collect();
            for handle in handles {
                match handle.join().unwrap() {
                    Ok(record) => {
                        assert_eq!(record.status, SubmissionStatus::Submitted);
                        submitted += 1;
                    }
                    Err(SubmitError::DuplicateSubmission { .. }) => duplicates += 1,
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }
        });

        assert_eq!(submitted, 1);
        assert_eq!(duplicates, 1);
        assert_eq!(fixture.chain.entries_of_kind(EventKind::Transmitted).len(), 1);
        assert_eq!(
            fixture
                .chain
                .entries_of_kind(EventKind::DuplicateBlocked)
                .len(),
            1
        );
        assert!(fixture.chain.verify().ok);
    }

    #[test]
    fn test_integrity_helper_matches_hash() {
        let fixture = fixture();
        let draft = sample_draft();
        let confirmation = fixture
            .registry
            .issue(draft.request_id, "alice", &draft.report_hash());
        assert!(verify_report_integrity(&confirmation, &draft));

        let mut tampered = draft.clone();
        tampered.description = "stored".into();
        assert!(!verify_report_integrity(&confirmation, &tampered));
    }
}
