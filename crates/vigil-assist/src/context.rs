//! Context hints
//!
//! A fixed regex pattern-reminder set and a fixed keyword checklist
//! set, both carried over unchanged between runs. Hints remind the
//! human what they commonly look for; they carry no severity and no
//! verdict of any kind.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use vigil_boundary::{AdvisoryStamp, BoundaryGuard, ComponentManifest};

use crate::error::Result;
use crate::observer::BrowserObservation;

/// What produced a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintKind {
    /// A URL/content shape the human may want to test.
    PatternReminder,
    /// Neutral context about where the human is.
    ContextInfo,
    /// A checklist of common testing areas.
    ChecklistReminder,
}

/// An advisory hint tied to one observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextHint {
    pub hint_id: Uuid,
    pub kind: HintKind,
    pub title: String,
    pub description: String,
    /// Name of the pattern or checklist trigger that fired.
    pub source: String,
    pub observation_id: Uuid,
    /// Always true; hints never become conclusions.
    pub hint_only: bool,
    pub stamp: AdvisoryStamp,
}

struct PatternReminder {
    name: &'static str,
    pattern: &'static str,
    title: &'static str,
    description: &'static str,
    kind: HintKind,
}

const PATTERN_REMINDERS: &[PatternReminder] = &[
    PatternReminder {
        name: "reflected_parameter",
        pattern: r"[?&][^=&]+=[^&]*",
        title: "URL parameter present",
        description: "URL carries parameters. The human may want to check reflection handling.",
        kind: HintKind::PatternReminder,
    },
    PatternReminder {
        name: "form_action",
        pattern: r#"<form[^>]*action=['"][^'"]*['"]"#,
        title: "Form action present",
        description: "A form with an action attribute was observed.",
        kind: HintKind::PatternReminder,
    },
    PatternReminder {
        name: "hidden_input",
        pattern: r#"<input[^>]*type=['"]hidden['"][^>]*>"#,
        title: "Hidden input present",
        description: "A hidden form input was observed.",
        kind: HintKind::PatternReminder,
    },
    PatternReminder {
        name: "error_message",
        pattern: r"(?i)(error|exception|warning|failed|invalid|denied)",
        title: "Possible error text",
        description: "Content may contain an error message.",
        kind: HintKind::ContextInfo,
    },
    PatternReminder {
        name: "redirect_parameter",
        pattern: r"(?i)[?&](redirect|return|next|url|goto|dest|destination)=",
        title: "Redirect-shaped parameter",
        description: "URL carries a redirect-shaped parameter.",
        kind: HintKind::PatternReminder,
    },
    PatternReminder {
        name: "file_parameter",
        pattern: r"(?i)[?&](file|path|doc|document|page|include)=",
        title: "File-shaped parameter",
        description: "URL carries a file-shaped parameter.",
        kind: HintKind::PatternReminder,
    },
    PatternReminder {
        name: "numeric_id_parameter",
        pattern: r"(?i)[?&](id|user_id|account|uid|pid)=\d+",
        title: "Numeric id parameter",
        description: "URL carries a numeric id parameter.",
        kind: HintKind::PatternReminder,
    },
    PatternReminder {
        name: "api_endpoint",
        pattern: r"/api/|/v\d+/|/rest/|/graphql",
        title: "API endpoint",
        description: "URL looks like an API endpoint.",
        kind: HintKind::ContextInfo,
    },
    PatternReminder {
        name: "auth_endpoint",
        pattern: r"(?i)/(login|signin|auth|oauth|token|session)",
        title: "Authentication endpoint",
        description: "URL looks authentication-related.",
        kind: HintKind::ContextInfo,
    },
    PatternReminder {
        name: "admin_path",
        pattern: r"(?i)/(admin|dashboard|manage|control|panel)",
        title: "Administrative path",
        description: "URL looks administrative.",
        kind: HintKind::ContextInfo,
    },
];

struct ChecklistTrigger {
    trigger: &'static str,
    title: &'static str,
    description: &'static str,
}

const CHECKLIST_TRIGGERS: &[ChecklistTrigger] = &[
    ChecklistTrigger {
        trigger: "form",
        title: "Form checklist",
        description: "Common areas: input validation, CSRF tokens, encoding, file uploads.",
    },
    ChecklistTrigger {
        trigger: "api",
        title: "API checklist",
        description: "Common areas: authentication, authorization, rate limiting, input validation.",
    },
    ChecklistTrigger {
        trigger: "auth",
        title: "Authentication checklist",
        description: "Common areas: password policy, session handling, MFA, lockout.",
    },
    ChecklistTrigger {
        trigger: "upload",
        title: "Upload checklist",
        description: "Common areas: type validation, size limits, storage location.",
    },
];

/// Runs the fixed pattern and checklist sets over observations.
pub struct ContextAnalyzer {
    compiled: Vec<(usize, Regex)>,
}

impl ContextAnalyzer {
    /// Construct the analyzer, presenting its manifest to the guard.
    pub fn new(guard: &BoundaryGuard) -> Result<Self> {
        let manifest = ComponentManifest::new("context_analyzer").with_method("analyze");
        guard.admit(&manifest)?;
        let compiled = PATTERN_REMINDERS
            .iter()
            .enumerate()
            .map(|(index, reminder)| {
                // Patterns are fixed at build time; compilation cannot fail.
                (index, Regex::new(reminder.pattern).expect("fixed pattern"))
            })
            .collect();
        Ok(ContextAnalyzer { compiled })
    }

    /// Produce the hints one observation triggers.
    pub fn analyze(&self, observation: &BrowserObservation) -> Vec<ContextHint> {
        let stamp = AdvisoryStamp::new();
        let haystack = format!("{}\n{}", observation.url, observation.content);
        let mut hints = Vec::new();

        for (index, regex) in &self.compiled {
            if regex.is_match(&haystack) {
                let reminder = &PATTERN_REMINDERS[*index];
                hints.push(ContextHint {
                    hint_id: Uuid::new_v4(),
                    kind: reminder.kind,
                    title: reminder.title.to_string(),
                    description: reminder.description.to_string(),
                    source: reminder.name.to_string(),
                    observation_id: observation.observation_id,
                    hint_only: true,
                    stamp,
                });
            }
        }

        let lowered = haystack.to_lowercase();
        for trigger in CHECKLIST_TRIGGERS {
            if lowered.contains(trigger.trigger) {
                hints.push(ContextHint {
                    hint_id: Uuid::new_v4(),
                    kind: HintKind::ChecklistReminder,
                    title: trigger.title.to_string(),
                    description: trigger.description.to_string(),
                    source: trigger.trigger.to_string(),
                    observation_id: observation.observation_id,
                    hint_only: true,
                    stamp,
                });
            }
        }

        debug!(
            observation_id = %observation.observation_id,
            hints = hints.len(),
            "observation analyzed"
        );
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssistConfig;
    use crate::observer::{BrowserObserver, ObservationKind};
    use std::collections::BTreeMap;
    use vigil_boundary::BoundaryGuard;

    fn observe(url: &str, content: &str) -> BrowserObservation {
        let observer =
            BrowserObserver::new(&BoundaryGuard::default(), &AssistConfig::default()).unwrap();
        observer
            .receive_observation(ObservationKind::PageView, url, content, BTreeMap::new())
            .unwrap()
    }

    #[test]
    fn test_parameter_url_triggers_reminder() {
        let analyzer = ContextAnalyzer::new(&BoundaryGuard::default()).unwrap();
        let obs = observe("https://example.com/search?q=test", "results page");
        let hints = analyzer.analyze(&obs);
        assert!(hints.iter().any(|h| h.source == "reflected_parameter"));
    }

    #[test]
    fn test_redirect_and_id_parameters() {
        let analyzer = ContextAnalyzer::new(&BoundaryGuard::default()).unwrap();
        let obs = observe(
            "https://example.com/go?redirect=/home&user_id=42",
            "redirecting",
        );
        let hints = analyzer.analyze(&obs);
        assert!(hints.iter().any(|h| h.source == "redirect_parameter"));
        assert!(hints.iter().any(|h| h.source == "numeric_id_parameter"));
    }

    #[test]
    fn test_form_content_triggers_pattern_and_checklist() {
        let analyzer = ContextAnalyzer::new(&BoundaryGuard::default()).unwrap();
        let obs = observe(
            "https://example.com/contact",
            r#"<form action="/submit"><input type="hidden" name="t" value="1"></form>"#,
        );
        let hints = analyzer.analyze(&obs);
        assert!(hints.iter().any(|h| h.source == "form_action"));
        assert!(hints.iter().any(|h| h.source == "hidden_input"));
        assert!(hints
            .iter()
            .any(|h| h.kind == HintKind::ChecklistReminder && h.source == "form"));
    }

    #[test]
    fn test_every_hint_is_stamped_advisory() {
        let analyzer = ContextAnalyzer::new(&BoundaryGuard::default()).unwrap();
        let obs = observe("https://example.com/api/v1/users?id=7", "{\"error\": true}");
        let hints = analyzer.analyze(&obs);
        assert!(!hints.is_empty());
        for hint in hints {
            assert!(hint.hint_only);
            assert!(hint.stamp.human_confirmation_required);
            assert!(hint.stamp.no_auto_action);
        }
    }

    #[test]
    fn test_hints_carry_no_severity_field() {
        let analyzer = ContextAnalyzer::new(&BoundaryGuard::default()).unwrap();
        let obs = observe("https://example.com/admin", "panel");
        let hints = analyzer.analyze(&obs);
        let json = serde_json::to_value(&hints[0]).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert!(!keys.iter().any(|k| k.contains("severity")));
        assert!(!keys.iter().any(|k| k.contains("verdict")));
    }

    #[test]
    fn test_quiet_content_yields_no_hints() {
        let analyzer = ContextAnalyzer::new(&BoundaryGuard::default()).unwrap();
        let obs = observe("https://example.com/about", "plain text page");
        assert!(analyzer.analyze(&obs).is_empty());
    }
}
