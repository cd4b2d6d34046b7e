//! VIGIL Truth-Engine Client
//!
//! The sole interface between the exploration core and the external
//! Truth Engine. The core submits observations and receives
//! classifications; it never classifies, never generates proofs, never
//! computes confidence, and never overrides a verdict. When the engine
//! is unreachable there is no fallback: exploration hard-stops.

pub mod client;
pub mod engine;
pub mod error;
pub mod guard;
pub mod types;

pub use client::TruthClient;
pub use engine::TruthEngine;
pub use error::{Result, TruthError};
pub use guard::SubmissionGuard;
pub use types::{
    ActionKind, ActionResult, Classification, ClassificationKind, ExplorationAction, Observation,
    RateLimitStatus, ScopeValidation, ToolOutput,
};
