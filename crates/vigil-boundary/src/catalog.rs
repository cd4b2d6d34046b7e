//! Forbidden-capability catalogs
//!
//! Closed-set lists of module names, action-name patterns, and phase
//! identifiers that core components must never touch. The catalog is an
//! immutable value injected into the guard at construction; there is no
//! global registry and no runtime mutation.

use serde::{Deserialize, Serialize};

/// Identifier of a pipeline phase.
///
/// Phases 4 through 10 hold frozen decision and submission data and are
/// read-only to every component admitted by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseId(pub u8);

impl PhaseId {
    /// First phase of the read-only range.
    pub const READ_ONLY_FIRST: u8 = 4;
    /// Last phase of the read-only range.
    pub const READ_ONLY_LAST: u8 = 10;

    /// Whether this phase holds frozen data no core component may write.
    pub fn is_read_only(self) -> bool {
        (Self::READ_ONLY_FIRST..=Self::READ_ONLY_LAST).contains(&self.0)
    }
}

/// Immutable catalog of everything a core component is forbidden to carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForbiddenCatalog {
    /// Module names that must not appear in a component's import list.
    pub forbidden_modules: Vec<String>,
    /// Exact method names that must not appear on a component.
    pub forbidden_actions: Vec<String>,
    /// Method-name prefixes that must not appear on a component.
    pub forbidden_action_prefixes: Vec<String>,
}

impl ForbiddenCatalog {
    /// Check a module name against the closed set.
    pub fn is_forbidden_module(&self, module: &str) -> bool {
        self.forbidden_modules.iter().any(|m| m == module)
    }

    /// Check a method name against exact names, prefixes, and the
    /// read-only phase write pattern (`write_phase_N_*`).
    pub fn is_forbidden_action(&self, method: &str) -> bool {
        if self.forbidden_actions.iter().any(|a| a == method) {
            return true;
        }
        if self
            .forbidden_action_prefixes
            .iter()
            .any(|p| method.starts_with(p.as_str()))
        {
            return true;
        }
        is_phase_write_name(method)
    }
}

impl Default for ForbiddenCatalog {
    fn default() -> Self {
        ForbiddenCatalog {
            forbidden_modules: [
                // Process and payload execution
                "std::process",
                "subprocess",
                "libc::system",
                // HTTP clients
                "reqwest",
                "hyper",
                "ureq",
                "curl",
                "isahc",
                // Browser automation
                "fantoccini",
                "thirtyfour",
                "headless_chrome",
                "selenium",
                "playwright",
                // UI automation
                "enigo",
                "autopilot",
                "rdev",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            forbidden_actions: [
                "submit_report",
                "send_report",
                "transmit_report",
                "auto_submit",
                "guided_submission",
                "generate_poc",
                "create_exploit",
                "chain_findings",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            forbidden_action_prefixes: [
                "execute_", "inject_", "classify_", "auto_", "bypass_", "intercept_",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Match `write_phase_N_*` for N in the read-only range.
fn is_phase_write_name(method: &str) -> bool {
    let Some(rest) = method.strip_prefix("write_phase_") else {
        return false;
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u8>() {
        Ok(n) => PhaseId(n).is_read_only(),
        Err(_) => false,
    }
}
