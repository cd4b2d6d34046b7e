//! Static symbol validation
//!
//! Membership checks against a versioned, frozen allow/deny pair. The
//! denylist names language-level dangerous operations and takes
//! precedence over any allowlist entry. Pass or fail; never a score.

use std::collections::BTreeSet;
use tracing::warn;

use crate::types::{SymbolConstraints, SymbolValidation};

/// Version of the built-in constraint set.
pub const CONSTRAINT_VERSION: &str = "1.0.0";

/// Dangerous symbols that must never appear in a patch.
const DENYLIST: &[&str] = &[
    // Dynamic evaluation
    "eval",
    "exec",
    "compile",
    "dynamic_import",
    "__import__",
    // Raw process invocation
    "os.system",
    "subprocess.call",
    "subprocess.run",
    "subprocess.Popen",
    "std::process::Command",
    "libc::system",
];

/// The built-in constraint set.
///
/// The allowlist starts empty: symbols become modifiable only when a
/// release explicitly lists them. Frozen at runtime.
pub fn default_constraints() -> SymbolConstraints {
    SymbolConstraints {
        allowlist: BTreeSet::new(),
        denylist: DENYLIST.iter().map(|s| s.to_string()).collect(),
        version: CONSTRAINT_VERSION.to_string(),
    }
}

/// Validate modified symbols against the constraints.
///
/// Denylist membership blocks a symbol regardless of the allowlist;
/// anything not explicitly allowed is blocked as well.
pub fn validate_symbols(symbols: &[String], constraints: &SymbolConstraints) -> SymbolValidation {
    let mut blocked = Vec::new();

    for symbol in symbols {
        if constraints.denylist.contains(symbol) {
            blocked.push(symbol.clone());
            continue;
        }
        if !constraints.allowlist.contains(symbol) {
            blocked.push(symbol.clone());
        }
    }

    if !blocked.is_empty() {
        warn!(?blocked, "symbol validation failed");
    }

    SymbolValidation {
        passed: blocked.is_empty(),
        blocked_symbols: blocked,
        constraint_version: constraints.version.clone(),
    }
}
