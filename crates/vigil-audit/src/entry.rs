//! Audit entries and canonical encoding
//!
//! The entry hash covers a canonical, field-order-deterministic byte
//! string of every field except the hash itself, concatenated with the
//! previous entry's hash. The canonical form is independent of serde so
//! that serialization changes can never silently alter the chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::EventKind;
use crate::hash::EntryHash;

/// Insertion-ordered key/value payload with string values.
///
/// Order is part of the canonical encoding, so payload construction
/// must be deterministic at every call site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload(Vec<(String, String)>);

impl Payload {
    /// Empty payload.
    pub fn new() -> Self {
        Payload(Vec::new())
    }

    /// Append a key/value pair, preserving insertion order.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// First value recorded under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Canonical `k=v;k=v` form. Empty payload encodes as the empty string.
    pub fn canonical_form(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One immutable link of the audit chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier.
    pub entry_id: Uuid,
    /// Dense, strictly increasing position in the chain.
    pub seq: u64,
    /// UTC time of the append.
    pub timestamp: DateTime<Utc>,
    /// Typed event being recorded.
    pub event_kind: EventKind,
    /// Who performed the recorded action.
    pub actor: String,
    /// Ordered event payload.
    pub payload: Payload,
    /// Hash of the previous entry (genesis constant for seq 0).
    pub previous_hash: EntryHash,
    /// Hash of this entry's canonical form and the previous hash.
    pub entry_hash: EntryHash,
}

impl AuditEntry {
    /// Canonical byte string hashed into `entry_hash`.
    ///
    /// Timestamps enter as epoch milliseconds so the encoding is
    /// independent of textual formatting.
    pub fn canonical_bytes(
        seq: u64,
        timestamp: DateTime<Utc>,
        event_kind: EventKind,
        actor: &str,
        payload: &Payload,
    ) -> Vec<u8> {
        format!(
            "{}\n{}\n{}\n{}\n{}\n",
            seq,
            timestamp.timestamp_millis(),
            event_kind.as_str(),
            actor,
            payload.canonical_form(),
        )
        .into_bytes()
    }

    /// Compute the hash this entry must carry.
    pub fn compute_hash(
        seq: u64,
        timestamp: DateTime<Utc>,
        event_kind: EventKind,
        actor: &str,
        payload: &Payload,
        previous_hash: &EntryHash,
    ) -> EntryHash {
        let mut data = Self::canonical_bytes(seq, timestamp, event_kind, actor, payload);
        data.extend_from_slice(previous_hash.as_bytes());
        EntryHash::digest(&data)
    }

    /// Recompute this entry's hash from its own fields.
    pub fn recompute_hash(&self) -> EntryHash {
        Self::compute_hash(
            self.seq,
            self.timestamp,
            self.event_kind,
            &self.actor,
            &self.payload,
            &self.previous_hash,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(seq: u64, previous_hash: EntryHash) -> AuditEntry {
        let timestamp = Utc::now();
        let payload = Payload::new().with("confirmation_id", "c-1");
        let entry_hash = AuditEntry::compute_hash(
            seq,
            timestamp,
            EventKind::ConfirmationIssued,
            "registry",
            &payload,
            &previous_hash,
        );
        AuditEntry {
            entry_id: Uuid::new_v4(),
            seq,
            timestamp,
            event_kind: EventKind::ConfirmationIssued,
            actor: "registry".to_string(),
            payload,
            previous_hash,
            entry_hash,
        }
    }

    #[test]
    fn test_payload_preserves_insertion_order() {
        let payload = Payload::new().with("b", "2").with("a", "1");
        assert_eq!(payload.canonical_form(), "b=2;a=1");
        assert_eq!(payload.get("a"), Some("1"));
        assert_eq!(payload.get("missing"), None);
    }

    #[test]
    fn test_hash_covers_every_field() {
        let entry = make_entry(0, EntryHash::GENESIS);
        assert_eq!(entry.recompute_hash(), entry.entry_hash);

        let mut tampered = entry.clone();
        tampered.actor = "impostor".to_string();
        assert_ne!(tampered.recompute_hash(), tampered.entry_hash);

        let mut tampered = entry.clone();
        tampered.payload = Payload::new().with("confirmation_id", "c-2");
        assert_ne!(tampered.recompute_hash(), tampered.entry_hash);

        let mut tampered = entry;
        tampered.seq = 1;
        assert_ne!(tampered.recompute_hash(), tampered.entry_hash);
    }

    #[test]
    fn test_hash_depends_on_previous() {
        let first = make_entry(0, EntryHash::GENESIS);
        let a = make_entry(1, first.entry_hash);
        let altered = AuditEntry::compute_hash(
            a.seq,
            a.timestamp,
            a.event_kind,
            &a.actor,
            &a.payload,
            &EntryHash::digest(b"other"),
        );
        assert_ne!(a.entry_hash, altered);
    }
}
