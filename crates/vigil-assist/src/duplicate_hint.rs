//! Duplicate hints
//!
//! Compares new content against previously registered findings and
//! warns when they look similar. The similarity score is a heuristic
//! over normalized text; it never blocks, never rejects, and never
//! asserts duplication. The human decides.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;
use uuid::Uuid;

use vigil_boundary::{AdvisoryStamp, BoundaryGuard, ComponentManifest};

use crate::config::AssistConfig;
use crate::error::Result;

/// Content similarity weight in the combined score.
const CONTENT_WEIGHT: f64 = 0.8;
/// URL similarity weight in the combined score.
const URL_WEIGHT: f64 = 0.2;
/// Bound on the registered-finding store.
const MAX_KNOWN_FINDINGS: usize = 1_000;

/// Advisory warning that new content resembles a known finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateHint {
    pub hint_id: Uuid,
    pub current_url: String,
    pub similar_finding_id: Option<String>,
    /// Heuristic score in [0, 1]. Not a certainty.
    pub similarity_score: f64,
    pub similarity_reason: String,
    pub timestamp: DateTime<Utc>,
    /// Always true.
    pub is_heuristic: bool,
    /// Always true.
    pub does_not_block: bool,
    pub disclaimer: String,
    pub stamp: AdvisoryStamp,
}

struct KnownFinding {
    finding_id: String,
    url: String,
    content: String,
}

/// Produces duplicate hints against a bounded finding store.
pub struct DuplicateHintEngine {
    threshold: f64,
    known: Mutex<VecDeque<KnownFinding>>,
}

impl DuplicateHintEngine {
    /// Construct the engine, presenting its manifest to the guard.
    pub fn new(guard: &BoundaryGuard, config: &AssistConfig) -> Result<Self> {
        let manifest = ComponentManifest::new("duplicate_hint_engine")
            .with_method("check_for_duplicates")
            .with_method("register_finding");
        guard.admit(&manifest)?;
        Ok(DuplicateHintEngine {
            threshold: config.duplicate_threshold.clamp(0.0, 1.0),
            known: Mutex::new(VecDeque::new()),
        })
    }

    /// Register a finding for future comparisons, returning its id.
    pub fn register_finding(&self, url: &str, content: &str, finding_id: Option<String>) -> String {
        let finding_id = finding_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut known = self.known.lock();
        if known.len() >= MAX_KNOWN_FINDINGS {
            known.pop_front();
        }
        known.push_back(KnownFinding {
            finding_id: finding_id.clone(),
            url: url.to_string(),
            content: content.to_string(),
        });
        finding_id
    }

    /// Compare content against every known finding.
    ///
    /// Returns a hint when the best combined score meets the threshold,
    /// and `None` otherwise. Never blocks either way.
    pub fn check_for_duplicates(&self, url: &str, content: &str) -> Option<DuplicateHint> {
        if content.is_empty() {
            return None;
        }

        let mut best_score = 0.0f64;
        let mut best_id: Option<String> = None;
        let mut reason = String::new();

        let known = self.known.lock();
        for finding in known.iter() {
            let content_similarity = sequence_ratio(content, &finding.content);
            let url_similarity = sequence_ratio(url, &finding.url);
            let combined = content_similarity * CONTENT_WEIGHT + url_similarity * URL_WEIGHT;

            if combined > best_score {
                best_score = combined;
                best_id = Some(finding.finding_id.clone());
                reason = if content_similarity >= self.threshold {
                    format!("content similarity {:.0}%", content_similarity * 100.0)
                } else if url_similarity >= self.threshold {
                    format!("url similarity {:.0}%", url_similarity * 100.0)
                } else {
                    format!("combined similarity {:.0}%", combined * 100.0)
                };
            }
        }
        drop(known);

        if best_score < self.threshold {
            return None;
        }

        debug!(score = best_score, "duplicate hint raised");
        Some(DuplicateHint {
            hint_id: Uuid::new_v4(),
            current_url: url.to_string(),
            similar_finding_id: best_id,
            similarity_score: best_score,
            similarity_reason: reason,
            timestamp: Utc::now(),
            is_heuristic: true,
            does_not_block: true,
            disclaimer: "Heuristic estimate - human verification required".to_string(),
            stamp: AdvisoryStamp::new(),
        })
    }

    /// Number of registered findings.
    pub fn known_findings(&self) -> usize {
        self.known.lock().len()
    }

    /// Drop all registered findings, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut known = self.known.lock();
        let count = known.len();
        known.clear();
        count
    }
}

/// Similarity ratio over case-normalized, whitespace-trimmed text.
///
/// `2 * lcs / (len_a + len_b)`, 1.0 for identical inputs and 0.0 when
/// either side is empty. Heuristic only.
fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // Longest common subsequence over two rows.
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
        current.fill(0);
    }
    let lcs = previous[b.len()];
    (2.0 * lcs as f64) / (a.len() + b.len()) as f64
}
