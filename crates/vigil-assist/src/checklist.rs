//! Submission checklist
//!
//! Neutral-language reminders the human checks off before submitting.
//! Items carry no score, no rank, and no priority; order is the order
//! they were added.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AssistError, Result};

/// One neutral checklist item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub item_id: String,
    pub description: String,
    /// Who checked the item off, once someone has.
    pub checked_by: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl ChecklistItem {
    pub fn new(item_id: impl Into<String>, description: impl Into<String>) -> Self {
        ChecklistItem {
            item_id: item_id.into(),
            description: description.into(),
            checked_by: None,
            checked_at: None,
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked_by.is_some()
    }
}

/// A human-operated pre-submission checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionChecklist {
    items: Vec<ChecklistItem>,
}

impl SubmissionChecklist {
    /// Checklist with the standard reminder items.
    pub fn standard() -> Self {
        SubmissionChecklist {
            items: vec![
                ChecklistItem::new("CHECK-001", "Review finding details"),
                ChecklistItem::new("CHECK-002", "Confirm the finding is within program scope"),
                ChecklistItem::new("CHECK-003", "Prepare the submission URL"),
                ChecklistItem::new("CHECK-004", "Review the draft report text"),
                ChecklistItem::new("CHECK-005", "Export the report"),
            ],
        }
    }

    /// Empty checklist for caller-provided items.
    pub fn new(items: Vec<ChecklistItem>) -> Self {
        SubmissionChecklist { items }
    }

    /// Items in their stored order.
    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Record that a human checked one item off.
    pub fn check_off(&mut self, item_id: &str, checked_by: &str) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.item_id == item_id)
            .ok_or_else(|| AssistError::UnknownChecklistItem {
                item_id: item_id.to_string(),
            })?;
        item.checked_by = Some(checked_by.to_string());
        item.checked_at = Some(Utc::now());
        Ok(())
    }

    /// Whether every item has been checked off.
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(ChecklistItem::is_checked)
    }

    /// Items still waiting to be checked off.
    pub fn remaining(&self) -> Vec<&ChecklistItem> {
        self.items.iter().filter(|item| !item.is_checked()).collect()
    }
}
