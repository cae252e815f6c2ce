//! Shared data models: normalized diagnostics and the project settings schema.

pub mod settings;

use serde::Serialize;
use std::fmt;

/// Longest description emitted on one diagnostic line.
pub const MAX_DESCRIPTION: usize = 60;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Normalized severity of a finding.
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Upper-case label used at the start of a flymake line.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One finding produced from a single matched output line.
pub struct Diagnostic {
    #[serde(rename = "level")]
    pub severity: Severity,
    pub tool: String,
    pub error_type: String,
    pub error_number: String,
    pub description: String,
    pub filename: String,
    pub line_number: String,
}

impl Diagnostic {
    /// Build a diagnostic; the description is clipped to [`MAX_DESCRIPTION`].
    pub fn new(
        severity: Severity,
        tool: &str,
        error_type: &str,
        error_number: &str,
        description: &str,
        filename: &str,
        line_number: &str,
    ) -> Self {
        Self {
            severity,
            tool: tool.to_string(),
            error_type: error_type.to_string(),
            error_number: error_number.to_string(),
            description: truncate_description(description),
            filename: filename.to_string(),
            line_number: line_number.to_string(),
        }
    }

    /// Full code as the tool printed it, e.g. `C0111`.
    pub fn code(&self) -> String {
        format!("{}{}", self.error_type, self.error_number)
    }
}

/// Clip `text` to at most [`MAX_DESCRIPTION`] characters.
///
/// Longer text keeps its first 57 characters followed by `...`.
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() <= MAX_DESCRIPTION {
        return text.to_string();
    }
    let keep = MAX_DESCRIPTION - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
