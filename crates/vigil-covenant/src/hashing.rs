//! Covenant hashing
//!
//! SHA-256 hex digests over deterministic concatenations. Hashing only:
//! no content analysis of any kind.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// SHA-256 of raw patch content.
pub fn patch_hash(patch_content: &str) -> String {
    sha256_hex(patch_content.as_bytes())
}

/// SHA-256 of a decision record's identifying fields.
pub fn decision_hash(
    patch_id: Uuid,
    confirmed: bool,
    rejected: bool,
    reason: &str,
    timestamp: DateTime<Utc>,
) -> String {
    let combined = format!(
        "{}:{}:{}:{}:{}",
        patch_id,
        confirmed,
        rejected,
        reason,
        timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
    );
    sha256_hex(combined.as_bytes())
}

/// SHA-256 tying a patch hash and a decision hash to a timestamp.
pub fn binding_hash(patch_hash: &str, decision_hash: &str, timestamp: DateTime<Utc>) -> String {
    let combined = format!(
        "{}:{}:{}",
        patch_hash,
        decision_hash,
        timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
    );
    sha256_hex(combined.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_hash_is_sha256_hex() {
        let h = patch_hash("fn main() {}");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(h, patch_hash("fn main() {}"));
        assert_ne!(h, patch_hash("fn main() { }"));
    }

    #[test]
    fn test_decision_hash_covers_every_field() {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let base = decision_hash(id, true, false, "looks right", now);
        assert_ne!(base, decision_hash(id, false, false, "looks right", now));
        assert_ne!(base, decision_hash(id, true, true, "looks right", now));
        assert_ne!(base, decision_hash(id, true, false, "changed", now));
    }

    #[test]
    fn test_binding_hash_is_order_sensitive() {
        let now = Utc::now();
        let a = binding_hash("p", "d", now);
        let b = binding_hash("d", "p", now);
        assert_ne!(a, b);
    }
}
