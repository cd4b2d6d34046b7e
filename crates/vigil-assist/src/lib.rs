//! VIGIL Browser Assistant Core
//!
//! Passive assistance for a human hunter working in their own browser:
//! - An observation store that only ever receives data
//! - Pattern reminders and checklists that hint, never conclude
//! - Heuristic duplicate warnings that never block
//! - Advisory scope checks the human is free to override
//! - Draft reports whose judgement fields belong to the human
//! - A confirmation gate with no auto-approval of any kind
//!
//! Nothing here sends a command to a browser, touches the network, or
//! decides anything. Every output carries the advisory stamp.

pub mod checklist;
pub mod config;
pub mod context;
pub mod draft;
pub mod duplicate_hint;
pub mod error;
pub mod export;
pub mod gate;
pub mod observer;
pub mod scope;
pub mod url_open;

pub use checklist::{ChecklistItem, SubmissionChecklist};
pub use config::AssistConfig;
pub use context::{ContextAnalyzer, ContextHint, HintKind};
pub use draft::{DraftContent, DraftGenerator};
pub use duplicate_hint::{DuplicateHint, DuplicateHintEngine};
pub use error::{AssistError, Result};
pub use export::{ExportFormat, Exporter, Finding};
pub use gate::{AssistantOutput, ConfirmationStatus, HumanConfirmation, HumanGate};
pub use observer::{BrowserObservation, BrowserObserver, ObservationKind};
pub use scope::{ScopeChecker, ScopeStatus, ScopeWarning};
pub use url_open::{UrlOpenGate, UrlOpenRequest};
