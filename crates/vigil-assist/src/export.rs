//! Static report export
//!
//! Renders findings to static, non-executable text formats for manual
//! submission. Findings are listed alphabetically by title; there is
//! no ordering by importance because no importance exists here, and no
//! verification language because nothing has been verified.

use serde::{Deserialize, Serialize};

use crate::error::{AssistError, Result};

/// Allowed static export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Markdown,
    Text,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "txt",
        }
    }
}

/// File extensions that are never produced.
const FORBIDDEN_EXTENSIONS: &[&str] = &[
    "html", "htm", "js", "jsx", "ts", "tsx", "exe", "sh", "bat", "py", "rb",
];

/// One finding prepared for export. Description only; no judgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub finding_id: String,
    pub title: String,
    pub description: String,
}

/// Renders findings into static documents.
#[derive(Debug, Default)]
pub struct Exporter;

impl Exporter {
    pub fn new() -> Self {
        Exporter
    }

    /// Refuse filenames whose extension is not a static format.
    pub fn validate_filename(&self, filename: &str) -> Result<()> {
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        if FORBIDDEN_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AssistError::ExportRefused { extension });
        }
        Ok(())
    }

    /// Render findings, alphabetically by title.
    pub fn export(&self, findings: &[Finding], format: ExportFormat) -> String {
        let mut sorted: Vec<&Finding> = findings.iter().collect();
        sorted.sort_by(|a, b| a.title.cmp(&b.title));

        match format {
            ExportFormat::Markdown => self.render_markdown(&sorted),
            ExportFormat::Text => self.render_text(&sorted),
        }
    }

    fn render_markdown(&self, findings: &[&Finding]) -> String {
        let mut out = String::from("# Findings Export\n\n");
        out.push_str("All entries require human review before any submission.\n\n");
        for finding in findings {
            out.push_str(&format!("## {} ({})\n\n", finding.title, finding.finding_id));
            out.push_str(&format!("{}\n\n", finding.description));
        }
        out.push_str("---\nPrepared for manual submission by the human hunter.\n");
        out
    }

    fn render_text(&self, findings: &[&Finding]) -> String {
        let mut out = String::from("FINDINGS EXPORT\n");
        out.push_str("All entries require human review before any submission.\n\n");
        for finding in findings {
            out.push_str(&format!("{} ({})\n", finding.title, finding.finding_id));
            out.push_str(&format!("{}\n\n", finding.description));
        }
        out
    }
}
