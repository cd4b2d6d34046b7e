//! Platform adapter contract
//!
//! Adapters expose a single `submit` and self-police their outbound
//! request count: the counter must be bumped immediately before every
//! request, and a second bump inside one submit is an architectural
//! violation at the adapter layer. This makes "exactly one network call
//! per confirmation" structural rather than conventional.

use chrono::{SecondsFormat, Utc};
use tracing::warn;

use crate::draft::{DraftReport, Platform};
use crate::error::{Result, SubmitError};

/// Maximum outbound requests per submit invocation.
pub const MAX_REQUESTS_PER_SUBMIT: u32 = 1;

/// Per-submit outbound request counter.
#[derive(Debug, Default)]
pub struct RequestCounter {
    count: u32,
}

impl RequestCounter {
    pub fn new() -> Self {
        RequestCounter { count: 0 }
    }

    /// Reset at the start of each submit invocation.
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Call immediately before each outbound request.
    ///
    /// The counter advances before the check so a refused attempt is
    /// visible in `count()`.
    pub fn check_and_increment(&mut self) -> Result<()> {
        self.count += 1;
        if self.count > MAX_REQUESTS_PER_SUBMIT {
            warn!(count = self.count, "adapter exceeded request budget");
            return Err(SubmitError::AdapterViolation {
                request_count: self.count,
            });
        }
        Ok(())
    }

    /// Requests attempted during the current submit.
    pub fn count(&self) -> u32 {
        self.count
    }
}

/// The surface the transmit manager calls.
pub trait PlatformAdapter: Send {
    /// Which platform this adapter talks to.
    fn platform(&self) -> Platform;

    /// Transmit one draft, returning the platform submission id and the
    /// platform's response text.
    fn submit(&mut self, draft: &DraftReport) -> Result<(String, String)>;
}

/// Request-counting base contract for concrete adapters.
///
/// Implementors provide the actual delivery in
/// [`perform_submit`](CountingAdapter::perform_submit) and bump the
/// counter before every outbound request; the blanket
/// [`PlatformAdapter`] impl resets the counter per invocation.
pub trait CountingAdapter: Send {
    fn platform(&self) -> Platform;

    /// The per-submit request counter.
    fn counter(&mut self) -> &mut RequestCounter;

    /// Deliver the draft. Must call `check_and_increment` on the
    /// counter immediately before each outbound request.
    fn perform_submit(&mut self, draft: &DraftReport) -> Result<(String, String)>;
}

impl<T: CountingAdapter> PlatformAdapter for T {
    fn platform(&self) -> Platform {
        CountingAdapter::platform(self)
    }

    fn submit(&mut self, draft: &DraftReport) -> Result<(String, String)> {
        self.counter().reset();
        self.perform_submit(draft)
    }
}

/// Generic adapter producing the manual-submission markdown draft.
///
/// Performs no network I/O: the rendered markdown is the "response",
/// for a human to copy into whatever portal they choose.
#[derive(Debug, Default)]
pub struct MarkdownAdapter {
    counter: RequestCounter,
}

impl MarkdownAdapter {
    pub fn new() -> Self {
        MarkdownAdapter {
            counter: RequestCounter::new(),
        }
    }

    /// Render the fixed-section markdown form of a draft.
    pub fn render(draft: &DraftReport) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", draft.title));
        out.push_str("## Severity\n\n[Human must assign]\n\n");
        out.push_str(&format!("## Finding ID\n\n{}\n\n", draft.draft_id));
        out.push_str(&format!(
            "## Generated\n\n{}\n\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        out.push_str(&format!("## Description\n\n{}\n\n", draft.description));
        out.push_str("## Reproduction Steps\n\n");
        if draft.reproduction_steps.is_empty() {
            out.push_str("1. [Human must provide]\n");
        } else {
            for (index, step) in draft.reproduction_steps.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", index + 1, step.action));
                out.push_str(&format!("   - Expected: {}\n", step.expected));
                out.push_str(&format!("   - Actual: {}\n", step.actual));
            }
        }
        out.push_str("\n## Proof Summary\n\n");
        if draft.evidence_refs.is_empty() {
            out.push_str("[Human must provide]\n");
        } else {
            for reference in &draft.evidence_refs {
                out.push_str(&format!("- {reference}\n"));
            }
        }
        out.push_str("\n---\nGenerated by the VIGIL draft assistant. Human review required.\n");
        out
    }
}

impl CountingAdapter for MarkdownAdapter {
    fn platform(&self) -> Platform {
        Platform::Generic
    }

    fn counter(&mut self) -> &mut RequestCounter {
        &mut self.counter
    }

    fn perform_submit(&mut self, draft: &DraftReport) -> Result<(String, String)> {
        // No outbound request: the counter is never incremented.
        Ok((format!("generic-{}", draft.draft_id), Self::render(draft)))
    }
}
