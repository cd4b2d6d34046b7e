//! The append-only chain
//!
//! Appends serialize on the tail lock; readers clone a snapshot and never
//! block writers for the duration of a verification walk. Sequence
//! numbers are dense from zero. Entries are never mutated or deleted.

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use vigil_boundary::{BoundaryGuard, ComponentManifest};

use crate::entry::{AuditEntry, Payload};
use crate::error::{AuditError, Result};
use crate::event::EventKind;
use crate::hash::EntryHash;

/// Coarse diagnostic for a verification finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingKind {
    /// The entry's recomputed hash differs from the stored hash.
    BodyMismatch,
    /// The entry's `previous_hash` does not match the prior entry.
    BrokenLink,
    /// Sequence numbers are not dense from zero.
    SeqGap,
}

/// One defect located by `verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainFinding {
    /// Sequence number of the offending entry.
    pub seq: u64,
    /// What failed.
    pub kind: FindingKind,
    /// Human-readable diagnostic.
    pub detail: String,
}

/// Outcome of a full chain walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True when every entry verified.
    pub ok: bool,
    /// Number of entries examined.
    pub entries_checked: usize,
    /// First sequence number that failed, if any.
    pub first_bad_seq: Option<u64>,
    /// All defects found, in sequence order.
    pub findings: Vec<ChainFinding>,
}

#[derive(Debug)]
struct ChainInner {
    entries: Vec<AuditEntry>,
    tip: EntryHash,
}

/// Append-only SHA-256 hash chain of typed events.
#[derive(Debug)]
pub struct AuditChain {
    inner: RwLock<ChainInner>,
}

impl AuditChain {
    /// Empty chain anchored at the genesis constant, admitted by the
    /// boundary guard.
    pub fn new(guard: &BoundaryGuard) -> Result<Self> {
        guard.admit(&Self::manifest())?;
        Ok(AuditChain {
            inner: RwLock::new(ChainInner {
                entries: Vec::new(),
                tip: EntryHash::GENESIS,
            }),
        })
    }

    fn manifest() -> ComponentManifest {
        ComponentManifest::new("audit_chain")
            .with_method("append")
            .with_method("snapshot")
            .with_method("verify")
    }

    /// Rebuild a chain from previously persisted entries.
    ///
    /// Admission applies here as on `new`; the entries are verified as
    /// they are adopted, and a defective prefix is refused outright
    /// rather than partially restored.
    pub fn restore(guard: &BoundaryGuard, entries: Vec<AuditEntry>) -> Result<Self> {
        guard.admit(&Self::manifest())?;
        let report = verify_entries(&entries);
        if !report.ok {
            let seq = report.first_bad_seq.unwrap_or(0);
            return Err(AuditError::IntegrityFault {
                first_bad_seq: seq,
                detail: "restore refused: persisted chain does not verify".to_string(),
            });
        }
        let tip = entries
            .last()
            .map(|e| e.entry_hash)
            .unwrap_or(EntryHash::GENESIS);
        Ok(AuditChain {
            inner: RwLock::new(ChainInner { entries, tip }),
        })
    }

    /// Append one typed event and return the sealed entry.
    pub fn append(&self, event_kind: EventKind, actor: &str, payload: Payload) -> AuditEntry {
        let mut inner = self.inner.write();
        let seq = inner.entries.len() as u64;
        let timestamp = Utc::now();
        let previous_hash = inner.tip;
        let entry_hash =
            AuditEntry::compute_hash(seq, timestamp, event_kind, actor, &payload, &previous_hash);
        let entry = AuditEntry {
            entry_id: Uuid::new_v4(),
            seq,
            timestamp,
            event_kind,
            actor: actor.to_string(),
            payload,
            previous_hash,
            entry_hash,
        };
        inner.tip = entry_hash;
        inner.entries.push(entry.clone());
        debug!(seq, kind = %event_kind, actor, "audit entry appended");
        entry
    }

    /// Clone the current entries. The clone is independent of later appends.
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.inner.read().entries.clone()
    }

    /// Entries of one kind, in chain order.
    pub fn entries_of_kind(&self, kind: EventKind) -> Vec<AuditEntry> {
        self.inner
            .read()
            .entries
            .iter()
            .filter(|e| e.event_kind == kind)
            .cloned()
            .collect()
    }

    /// Number of entries appended so far.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hash of the most recent entry (genesis constant when empty).
    pub fn tip(&self) -> EntryHash {
        self.inner.read().tip
    }

    /// Walk the chain from genesis, recomputing every hash.
    ///
    /// Runs against a snapshot; appends proceed concurrently.
    pub fn verify(&self) -> VerificationReport {
        let entries = self.snapshot();
        verify_entries(&entries)
    }

    /// Verify, and on failure record the inconsistency to the chain
    /// itself before surfacing the fault.
    pub fn check_integrity(&self, actor: &str) -> Result<VerificationReport> {
        let report = self.verify();
        if report.ok {
            return Ok(report);
        }
        let first_bad_seq = report.first_bad_seq.unwrap_or(0);
        let detail = report
            .findings
            .first()
            .map(|f| f.detail.clone())
            .unwrap_or_else(|| "chain verification failed".to_string());
        error!(first_bad_seq, "audit chain integrity fault");
        self.append(
            EventKind::ChainTamperingDetected,
            actor,
            Payload::new()
                .with("first_bad_seq", first_bad_seq.to_string())
                .with("detail", detail.clone()),
        );
        Err(AuditError::IntegrityFault {
            first_bad_seq,
            detail,
        })
    }
}

/// Verify an entry slice as a complete chain prefix.
pub fn verify_entries(entries: &[AuditEntry]) -> VerificationReport {
    let mut findings = Vec::new();
    let mut expected_prev = EntryHash::GENESIS;

    for (index, entry) in entries.iter().enumerate() {
        if entry.seq != index as u64 {
            findings.push(ChainFinding {
                seq: entry.seq,
                kind: FindingKind::SeqGap,
                detail: format!("expected seq {index}, found {}", entry.seq),
            });
        }
        if entry.previous_hash != expected_prev {
            findings.push(ChainFinding {
                seq: entry.seq,
                kind: FindingKind::BrokenLink,
                detail: format!(
                    "previous_hash {} does not match prior entry hash {}",
                    entry.previous_hash, expected_prev
                ),
            });
        }
        let recomputed = entry.recompute_hash();
        if recomputed != entry.entry_hash {
            findings.push(ChainFinding {
                seq: entry.seq,
                kind: FindingKind::BodyMismatch,
                detail: format!(
                    "stored hash {} but canonical form hashes to {}",
                    entry.entry_hash, recomputed
                ),
            });
        }
        expected_prev = entry.entry_hash;
    }

    VerificationReport {
        ok: findings.is_empty(),
        entries_checked: entries.len(),
        first_bad_seq: findings.first().map(|f| f.seq),
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn payload(n: usize) -> Payload {
        Payload::new().with("n", n.to_string())
    }

    #[test]
    fn test_seqs_are_dense_from_zero() {
        let chain = AuditChain::new(&BoundaryGuard::default()).unwrap();
        for n in 0..5 {
            let entry = chain.append(EventKind::ObservationSubmitted, "explorer", payload(n));
            assert_eq!(entry.seq, n as u64);
        }
        let entries = chain.snapshot();
        let seqs: Vec<u64> = entries.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_verify_ok_after_every_prefix() {
        let chain = AuditChain::new(&BoundaryGuard::default()).unwrap();
        for n in 0..8 {
            chain.append(EventKind::ClassificationReceived, "explorer", payload(n));
            let report = chain.verify();
            assert!(report.ok, "prefix of {} entries failed", n + 1);
            assert_eq!(report.entries_checked, n + 1);
        }
    }

    #[test]
    fn test_single_mutation_locates_first_bad_seq() {
        let chain = AuditChain::new(&BoundaryGuard::default()).unwrap();
        for n in 0..5 {
            chain.append(EventKind::ObservationSubmitted, "explorer", payload(n));
        }
        let mut entries = chain.snapshot();
        entries[3].actor = "tampered".to_string();
        let report = verify_entries(&entries);
        assert!(!report.ok);
        assert_eq!(report.first_bad_seq, Some(3));
        assert!(report
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::BodyMismatch));
    }

    #[test]
    fn test_broken_link_detected() {
        let chain = AuditChain::new(&BoundaryGuard::default()).unwrap();
        for n in 0..4 {
            chain.append(EventKind::ObservationSubmitted, "explorer", payload(n));
        }
        let mut entries = chain.snapshot();
        entries[2].previous_hash = EntryHash::digest(b"severed");
        // Recompute the body hash so only the link is broken.
        entries[2].entry_hash = entries[2].recompute_hash();
        let report = verify_entries(&entries);
        assert!(!report.ok);
        assert_eq!(report.first_bad_seq, Some(2));
        assert!(report
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::BrokenLink));
    }

    #[test]
    fn test_check_integrity_records_fresh_entry() {
        let chain = AuditChain::new(&BoundaryGuard::default()).unwrap();
        chain.append(EventKind::ObservationSubmitted, "explorer", payload(0));
        assert!(chain.check_integrity("auditor").is_ok());
        // A healthy check appends nothing.
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_restore_refuses_tampered_entries() {
        let chain = AuditChain::new(&BoundaryGuard::default()).unwrap();
        for n in 0..3 {
            chain.append(EventKind::ObservationSubmitted, "explorer", payload(n));
        }
        let mut entries = chain.snapshot();
        entries[1].actor = "tampered".to_string();
        let err = AuditChain::restore(&BoundaryGuard::default(), entries).unwrap_err();
        assert!(matches!(
            err,
            AuditError::IntegrityFault {
                first_bad_seq: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_concurrent_appends_stay_dense() {
        let chain = Arc::new(AuditChain::new(&BoundaryGuard::default()).unwrap());
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let chain = Arc::clone(&chain);
                scope.spawn(move || {
                    for n in 0..50 {
                        chain.append(EventKind::ObservationSubmitted, "worker", payload(n));
                    }
                });
            }
        });
        assert_eq!(chain.len(), 200);
        let report = chain.verify();
        assert!(report.ok);
        let entries = chain.snapshot();
        for (index, entry) in entries.iter().enumerate() {
            assert_eq!(entry.seq, index as u64);
        }
    }

    #[test]
    fn test_verification_does_not_halt_appends() {
        let chain = AuditChain::new(&BoundaryGuard::default()).unwrap();
        for n in 0..10 {
            chain.append(EventKind::ObservationSubmitted, "explorer", payload(n));
        }
        let snapshot_len = chain.snapshot().len();
        chain.append(EventKind::ExplorationStopped, "explorer", Payload::new());
        assert_eq!(chain.len(), snapshot_len + 1);
        assert!(chain.verify().ok);
    }
}
