//! Advisory stamps
//!
//! Every assistive output carries both flags set to true. The flags exist
//! so downstream consumers can verify the stamp rather than trust the
//! producing component.

use serde::{Deserialize, Serialize};

/// Flags stamped onto every assistive output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryStamp {
    /// A human must confirm before the output is acted upon.
    pub human_confirmation_required: bool,
    /// The output never triggers an action on its own.
    pub no_auto_action: bool,
}

impl AdvisoryStamp {
    /// Both flags true. There is no other valid construction.
    pub fn new() -> Self {
        AdvisoryStamp {
            human_confirmation_required: true,
            no_auto_action: true,
        }
    }

    /// Whether the stamp still carries both required flags.
    pub fn is_intact(&self) -> bool {
        self.human_confirmation_required && self.no_auto_action
    }
}

impl Default for AdvisoryStamp {
    fn default() -> Self {
        Self::new()
    }
}
