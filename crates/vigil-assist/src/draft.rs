//! Draft report generation
//!
//! Assembles a markdown template from observations. Observable evidence
//! is filled in; every judgement field is stamped for the human.
//! Severity and classification are never suggested, let alone set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use vigil_boundary::{AdvisoryStamp, BoundaryGuard, ComponentManifest};

use crate::error::Result;
use crate::observer::BrowserObservation;

/// Placeholder for every field the human owns.
pub const HUMAN_MUST_PROVIDE: &str = "[Human must provide]";

/// Maximum observations expanded into reproduction steps.
const MAX_STEP_OBSERVATIONS: usize = 5;
/// Maximum observations listed in the behavior summary.
const MAX_SUMMARY_OBSERVATIONS: usize = 10;

/// A generated draft for human review, editing, and confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftContent {
    pub draft_id: Uuid,
    pub title_suggestion: String,
    pub description_template: String,
    pub observed_behavior: String,
    pub related_observations: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    /// SHA-256 hex over the generated text fields.
    pub content_hash: String,
    /// Severity is reserved for the human.
    pub severity: String,
    /// Classification is reserved for the human.
    pub classification: String,
    /// Always true.
    pub is_template_only: bool,
    pub stamp: AdvisoryStamp,
}

/// Builds draft templates from observations.
#[derive(Debug)]
pub struct DraftGenerator;

impl DraftGenerator {
    /// Construct the generator, presenting its manifest to the guard.
    pub fn new(guard: &BoundaryGuard) -> Result<Self> {
        let manifest = ComponentManifest::new("draft_generator").with_method("generate");
        guard.admit(&manifest)?;
        Ok(DraftGenerator)
    }

    /// Generate a draft from observations.
    ///
    /// With no observations an empty template is produced; either way
    /// the human must review, edit, and confirm before anything
    /// happens with it.
    pub fn generate(
        &self,
        observations: &[BrowserObservation],
        title_hint: Option<&str>,
    ) -> DraftContent {
        let title = match title_hint {
            Some(hint) => format!("{hint} - human must finalize title"),
            None => self.suggest_title(observations),
        };
        let description = self.description_template(observations);
        let observed_behavior = self.summarize(observations);
        let related: Vec<Uuid> = observations.iter().map(|o| o.observation_id).collect();

        let content_hash = content_hash(&title, &description, &observed_behavior, &related);

        DraftContent {
            draft_id: Uuid::new_v4(),
            title_suggestion: title,
            description_template: description,
            observed_behavior,
            related_observations: related,
            created_at: Utc::now(),
            content_hash,
            severity: HUMAN_MUST_PROVIDE.to_string(),
            classification: HUMAN_MUST_PROVIDE.to_string(),
            is_template_only: true,
            stamp: AdvisoryStamp::new(),
        }
    }

    fn suggest_title(&self, observations: &[BrowserObservation]) -> String {
        let mut urls: Vec<&str> = observations.iter().map(|o| o.url.as_str()).collect();
        urls.dedup();
        if urls.len() == 1 {
            let url = urls[0];
            let segment = url
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty() && !s.contains("://"));
            if let Some(segment) = segment {
                return format!("[Finding on {segment}] - human must provide title");
            }
        }
        format!("[Finding title] {HUMAN_MUST_PROVIDE}")
    }

    fn description_template(&self, observations: &[BrowserObservation]) -> String {
        let mut parts = vec![
            "## Summary".to_string(),
            HUMAN_MUST_PROVIDE.to_string(),
            String::new(),
            "## Steps to Reproduce".to_string(),
        ];
        if observations.is_empty() {
            parts.push(format!("1. {HUMAN_MUST_PROVIDE}"));
        }
        for (index, obs) in observations.iter().take(MAX_STEP_OBSERVATIONS).enumerate() {
            parts.push(format!("{}. Navigate to: {}", index + 1, obs.url));
            parts.push(format!("   Observed: {}", preview(&obs.content, 100)));
        }
        parts.extend([
            String::new(),
            "## Expected Behavior".to_string(),
            HUMAN_MUST_PROVIDE.to_string(),
            String::new(),
            "## Actual Behavior".to_string(),
            HUMAN_MUST_PROVIDE.to_string(),
            String::new(),
            "## Impact".to_string(),
            HUMAN_MUST_PROVIDE.to_string(),
            String::new(),
            "## Severity".to_string(),
            "[Human must assign severity]".to_string(),
            String::new(),
            "## Classification".to_string(),
            "[Human must classify]".to_string(),
        ]);
        parts.join("\n")
    }

    fn summarize(&self, observations: &[BrowserObservation]) -> String {
        if observations.is_empty() {
            return "No observations provided.".to_string();
        }
        let mut parts = vec!["Observed browser activity:".to_string()];
        for obs in observations.iter().take(MAX_SUMMARY_OBSERVATIONS) {
            parts.push(format!(
                "- [{:?}] {}: {}",
                obs.kind,
                obs.url,
                preview(&obs.content, 50)
            ));
        }
        if observations.len() > MAX_SUMMARY_OBSERVATIONS {
            parts.push(format!(
                "... and {} more observations",
                observations.len() - MAX_SUMMARY_OBSERVATIONS
            ));
        }
        parts.join("\n")
    }
}

fn preview(content: &str, limit: usize) -> String {
    if content.len() <= limit {
        content.to_string()
    } else {
        let cut = content
            .char_indices()
            .take_while(|(i, _)| *i < limit)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(limit);
        format!("{}...", &content[..cut])
    }
}

fn content_hash(title: &str, description: &str, behavior: &str, related: &[Uuid]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"\n");
    hasher.update(description.as_bytes());
    hasher.update(b"\n");
    hasher.update(behavior.as_bytes());
    for id in related {
        hasher.update(b"\n");
        hasher.update(id.to_string().as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssistConfig;
    use crate::observer::{BrowserObserver, ObservationKind};
    use std::collections::BTreeMap;
    use vigil_boundary::BoundaryGuard;

    fn observations(urls: &[&str]) -> Vec<BrowserObservation> {
        let observer =
            BrowserObserver::new(&BoundaryGuard::default(), &AssistConfig::default()).unwrap();
        urls.iter()
            .map(|url| {
                observer
                    .receive_observation(
                        ObservationKind::PageView,
                        url,
                        "observed page content",
                        BTreeMap::new(),
                    )
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_empty_draft_is_all_human_fields() {
        let draft = DraftGenerator::new(&BoundaryGuard::default()).unwrap().generate(&[], None);
        assert!(draft.title_suggestion.contains("[Finding title]"));
        assert_eq!(draft.severity, HUMAN_MUST_PROVIDE);
        assert_eq!(draft.classification, HUMAN_MUST_PROVIDE);
        assert!(draft.is_template_only);
        assert_eq!(draft.observed_behavior, "No observations provided.");
        assert!(draft.stamp.is_intact());
    }

    #[test]
    fn test_severity_is_never_suggested() {
        let obs = observations(&["https://example.com/search?q=x"]);
        let draft = DraftGenerator::new(&BoundaryGuard::default()).unwrap().generate(&obs, Some("Reflected input"));
        assert!(draft
            .description_template
            .contains("[Human must assign severity]"));
        assert!(draft.description_template.contains("[Human must classify]"));
        assert_eq!(draft.severity, HUMAN_MUST_PROVIDE);
    }

    #[test]
    fn test_evidence_filled_from_observations() {
        let obs = observations(&["https://example.com/a", "https://example.com/b"]);
        let draft = DraftGenerator::new(&BoundaryGuard::default()).unwrap().generate(&obs, None);
        assert!(draft
            .description_template
            .contains("1. Navigate to: https://example.com/a"));
        assert!(draft
            .description_template
            .contains("2. Navigate to: https://example.com/b"));
        assert_eq!(draft.related_observations.len(), 2);
    }

    #[test]
    fn test_summary_is_bounded() {
        let urls: Vec<String> = (0..15).map(|n| format!("https://example.com/{n}")).collect();
        let url_refs: Vec<&str> = urls.iter().map(|s| s.as_str()).collect();
        let obs = observations(&url_refs);
        let draft = DraftGenerator::new(&BoundaryGuard::default()).unwrap().generate(&obs, None);
        assert!(draft.observed_behavior.contains("and 5 more observations"));
    }

    #[test]
    fn test_content_hash_tracks_inputs() {
        let obs = observations(&["https://example.com/settings"]);
        let generator = DraftGenerator::new(&BoundaryGuard::default()).unwrap();
        let a = generator.generate(&obs, Some("A"));
        let b = generator.generate(&obs, Some("B"));
        assert_ne!(a.content_hash, b.content_hash);
    }
}
