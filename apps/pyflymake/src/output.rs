//! Output rendering for normalized diagnostics.
//!
//! Supports `flymake` (default) and `json`. The flymake form is what the
//! editor parses with
//! `"\\(.*\\) at \\([^ \n]+\\) line \\([0-9]+\\)[,.\n]"`; empty fields keep
//! their surrounding punctuation.

use crate::models::Diagnostic;
use serde_json::json;
use serde_json::Value as JsonVal;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
/// Line format written to the sink.
pub enum OutputMode {
    #[default]
    Flymake,
    Json,
}

/// `LEVEL tool/TYPENUMBER:description at filename line N.`
pub fn format_flymake(d: &Diagnostic) -> String {
    format!(
        "{} {}/{}{}:{} at {} line {}.",
        d.severity.label(),
        d.tool,
        d.error_type,
        d.error_number,
        d.description,
        d.filename,
        d.line_number
    )
}

/// Compose the JSON object for one diagnostic (pure, for testing).
pub fn compose_json(d: &Diagnostic) -> JsonVal {
    json!({
        "level": d.severity,
        "tool": d.tool,
        "error_type": d.error_type,
        "error_number": d.error_number,
        "description": d.description,
        "filename": d.filename,
        "line_number": d.line_number,
    })
}

/// Render one diagnostic as a single output line (no trailing newline).
pub fn render(d: &Diagnostic, mode: OutputMode) -> String {
    match mode {
        OutputMode::Flymake => format_flymake(d),
        OutputMode::Json => compose_json(d).to_string(),
    }
}
