//! External Truth-Engine contract
//!
//! Implementations live outside the core. Returning an out-of-contract
//! value is a protocol violation, not a default.

use serde_json::Value;

use crate::error::Result;
use crate::types::{Classification, Observation, RateLimitStatus, ScopeValidation};

/// The external classifier the core submits observations to.
///
/// All four operations block until the engine answers or fails. The
/// core holds the engine behind this trait and never mutates its state.
pub trait TruthEngine: Send + Sync {
    /// Classify one observation.
    fn validate_observation(&self, observation: &Observation) -> Result<Classification>;

    /// Evaluate a target against the engine's scope rules.
    fn validate_scope(&self, target: &str) -> Result<ScopeValidation>;

    /// Current rate-limit status as the engine sees it.
    fn check_rate_limit(&self) -> Result<RateLimitStatus>;

    /// The engine's coverage report. Opaque to the core.
    fn coverage_report(&self) -> Result<Value>;
}
