//! Draft reports and their canonical hash
//!
//! The report hash is computed over a field-order-deterministic byte
//! string, never over serde output, so the binding between a human
//! confirmation and the exact bytes they reviewed cannot drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Bounty platforms a report can be transmitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    HackerOne,
    Bugcrowd,
    Generic,
}

impl Platform {
    /// Stable lowercase name used in audit payloads and submission keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::HackerOne => "hackerone",
            Platform::Bugcrowd => "bugcrowd",
            Platform::Generic => "generic",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One numbered reproduction step with its expected and actual outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReproStep {
    pub action: String,
    pub expected: String,
    pub actual: String,
}

/// A report drafted for human review and confirmation.
///
/// Severity and classification are human-provided values carried
/// verbatim; nothing here computes either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftReport {
    pub draft_id: Uuid,
    pub request_id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub classification: String,
    /// Ordered evidence references.
    pub evidence_refs: Vec<String>,
    /// Numbered reproduction steps.
    pub reproduction_steps: Vec<ReproStep>,
    /// Ordered platform-specific fields.
    pub custom_fields: Vec<(String, String)>,
    pub created_at: DateTime<Utc>,
}

impl DraftReport {
    /// New draft with empty evidence, steps, and custom fields.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: impl Into<String>,
        classification: impl Into<String>,
    ) -> Self {
        DraftReport {
            draft_id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            severity: severity.into(),
            classification: classification.into(),
            evidence_refs: Vec::new(),
            reproduction_steps: Vec::new(),
            custom_fields: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Canonical byte string covering every confirmable field in a
    /// fixed order. List entries keep their stored order.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(&format!("draft_id={}\n", self.draft_id));
        out.push_str(&format!("request_id={}\n", self.request_id));
        out.push_str(&format!("title={}\n", self.title));
        out.push_str(&format!("description={}\n", self.description));
        out.push_str(&format!("severity={}\n", self.severity));
        out.push_str(&format!("classification={}\n", self.classification));
        for reference in &self.evidence_refs {
            out.push_str(&format!("evidence={reference}\n"));
        }
        for (index, step) in self.reproduction_steps.iter().enumerate() {
            out.push_str(&format!(
                "step.{}={}|{}|{}\n",
                index + 1,
                step.action,
                step.expected,
                step.actual
            ));
        }
        for (key, value) in &self.custom_fields {
            out.push_str(&format!("field.{key}={value}\n"));
        }
        out.into_bytes()
    }

    /// SHA-256 hex digest of the canonical form.
    pub fn report_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        hex::encode(hasher.finalize())
    }
}
