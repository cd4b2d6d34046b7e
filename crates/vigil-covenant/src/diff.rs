//! Diff generation
//!
//! Produces a human-readable unified diff and a structural extraction
//! of the symbols it touches. Generation only: nothing here judges a
//! change, scores it, or recommends anything about it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Result of diffing two versions of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffResult {
    /// Unified diff text.
    pub diff_text: String,
    /// Symbols named on changed lines, structural extraction only.
    pub symbols_modified: Vec<String>,
    pub lines_added: usize,
    pub lines_removed: usize,
}

/// Generate a unified diff between two contents.
pub fn generate_diff(old_content: &str, new_content: &str) -> DiffResult {
    let old_lines: Vec<&str> = old_content.lines().collect();
    let new_lines: Vec<&str> = new_content.lines().collect();

    let mut diff_text = String::new();
    let mut lines_added = 0;
    let mut lines_removed = 0;

    if old_lines != new_lines {
        diff_text.push_str("--- a/file\n");
        diff_text.push_str("+++ b/file\n");
        for op in diff_ops(&old_lines, &new_lines) {
            match op {
                DiffOp::Keep(line) => {
                    diff_text.push_str(&format!(" {line}\n"));
                }
                DiffOp::Remove(line) => {
                    diff_text.push_str(&format!("-{line}\n"));
                    lines_removed += 1;
                }
                DiffOp::Add(line) => {
                    diff_text.push_str(&format!("+{line}\n"));
                    lines_added += 1;
                }
            }
        }
    }

    let symbols_modified = extract_symbols(&diff_text);
    DiffResult {
        diff_text,
        symbols_modified,
        lines_added,
        lines_removed,
    }
}

/// Extract symbol names from changed diff lines.
///
/// Matches item declarations (`fn`, `struct`, `enum`, `trait`,
/// `const`, `static`) and simple `let` bindings. Structural only; no
/// meaning is attached to any name.
pub fn extract_symbols(diff_text: &str) -> Vec<String> {
    let patterns = [
        r"(?m)^[+-]\s*(?:pub(?:\([^)]*\))?\s+)?fn\s+(\w+)",
        r"(?m)^[+-]\s*(?:pub(?:\([^)]*\))?\s+)?struct\s+(\w+)",
        r"(?m)^[+-]\s*(?:pub(?:\([^)]*\))?\s+)?enum\s+(\w+)",
        r"(?m)^[+-]\s*(?:pub(?:\([^)]*\))?\s+)?trait\s+(\w+)",
        r"(?m)^[+-]\s*(?:pub(?:\([^)]*\))?\s+)?const\s+(\w+)",
        r"(?m)^[+-]\s*(?:pub(?:\([^)]*\))?\s+)?static\s+(\w+)",
        r"(?m)^[+-]\s*let\s+(?:mut\s+)?(\w+)\s*[=:]",
    ];

    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    for pattern in patterns {
        // Fixed patterns; compilation cannot fail.
        let regex = Regex::new(pattern).expect("fixed pattern");
        for capture in regex.captures_iter(diff_text) {
            let name = capture[1].to_string();
            if name == "_" {
                continue;
            }
            if seen.insert(name.clone()) {
                symbols.push(name);
            }
        }
    }
    symbols
}

enum DiffOp<'a> {
    Keep(&'a str),
    Remove(&'a str),
    Add(&'a str),
}

/// Line diff via longest common subsequence.
fn diff_ops<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<DiffOp<'a>> {
    // LCS length table.
    let mut table = vec![vec![0usize; new.len() + 1]; old.len() + 1];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            table[i][j] = if old[i] == new[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            ops.push(DiffOp::Keep(old[i]));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(DiffOp::Remove(old[i]));
            i += 1;
        } else {
            ops.push(DiffOp::Add(new[j]));
            j += 1;
        }
    }
    while i < old.len() {
        ops.push(DiffOp::Remove(old[i]));
        i += 1;
    }
    while j < new.len() {
        ops.push(DiffOp::Add(new[j]));
        j += 1;
    }
    ops
}
