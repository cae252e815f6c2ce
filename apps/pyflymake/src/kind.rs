//! Per-checker behavior: launch command, output pattern, severity fixup,
//! invocation flags, stream selection and default ignore codes.
//!
//! Each checker prints one finding per line. Raw conventions:
//! - pylint (`--output-format parseable`):
//!   `render.py:49: [C0301] Line too long (82/80)` or
//!   `render.py:32: [C0111, render] Missing docstring`
//! - pychecker: `render.py:49: Parameter (maptype) not used`
//! - pep8: `spiders/structs.py:3:80: E501 line too long (80 characters)`
//! - pyflakes: `views.py:4: 'os' imported but unused`
//! - test runner: `test_x.py:12: In test_add: fail: expected 4 got 5`

use crate::config::Configuration;
use crate::models::settings::OutputStream;
use crate::models::{Diagnostic, Severity};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// The closed set of supported checkers, in execution order.
pub enum RunnerKind {
    Test,
    Pylint,
    Pychecker,
    Pep8,
    Pyflakes,
}

/// Fields pulled out of one raw output line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawMatch<'a> {
    pub filename: &'a str,
    pub line_number: &'a str,
    pub error_type: &'a str,
    pub error_number: &'a str,
    pub context: &'a str,
    pub description: &'a str,
}

const PYLINT_PATTERN: &str = r"^(?P<filename>[^:]+):(?P<line_number>\d+):\s*\[(?P<error_type>[A-Z])(?P<error_number>[^,\]]+)(?:,\s*(?P<context>[^\]]*))?\]\s*(?P<description>.*)$";
const PYCHECKER_PATTERN: &str =
    r"^(?P<filename>[^:]+):(?P<line_number>\d+):\s+(?P<description>.*)$";
const PEP8_PATTERN: &str = r"^(?P<filename>[^:]+):(?P<line_number>\d+):[^:]+: (?P<error_number>\w+) (?P<description>.+)$";
const PYFLAKES_PATTERN: &str =
    r"^(?P<filename>[^:]+):(?P<line_number>\d+):(?:\d+:)?\s*(?P<description>.*)$";
const TEST_PATTERN: &str = r"^(?P<filename>[^:]+):(?P<line_number>\d+):\s*In (?P<context>[^:]+):\s*(?P<error_number>[^:]+):\s*(?P<description>.*)$";

const PYLINT_DEFAULT_IGNORES: &[&str] = &[
    "C0103", // naming convention
    "C0111", // missing docstring
    "E1002", // super on old-style class
    "W0232", // no __init__
    "R0904", // too many public methods
    "R0903", // too few public methods
    "R0201", // method could be a function
];

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("built-in output pattern is valid"))
}

impl RunnerKind {
    pub const ALL: [RunnerKind; 5] = [
        RunnerKind::Test,
        RunnerKind::Pylint,
        RunnerKind::Pychecker,
        RunnerKind::Pep8,
        RunnerKind::Pyflakes,
    ];

    /// Lowercase tool label printed in each diagnostic line.
    pub fn name(self) -> &'static str {
        match self {
            RunnerKind::Test => "test",
            RunnerKind::Pylint => "lint",
            RunnerKind::Pychecker => "params",
            RunnerKind::Pep8 => "style",
            RunnerKind::Pyflakes => "flakes",
        }
    }

    /// Executable to launch; `None` when the test runner is not configured.
    pub fn command(self, cfg: &Configuration) -> Option<&str> {
        match self {
            RunnerKind::Test => cfg.test_runner_command.as_deref(),
            RunnerKind::Pylint => Some("pylint"),
            RunnerKind::Pychecker => Some("pychecker"),
            RunnerKind::Pep8 => Some("pep8"),
            RunnerKind::Pyflakes => Some("pyflakes"),
        }
    }

    pub fn matcher(self) -> &'static Regex {
        static PYLINT: OnceLock<Regex> = OnceLock::new();
        static PYCHECKER: OnceLock<Regex> = OnceLock::new();
        static PEP8: OnceLock<Regex> = OnceLock::new();
        static PYFLAKES: OnceLock<Regex> = OnceLock::new();
        static TEST: OnceLock<Regex> = OnceLock::new();
        match self {
            RunnerKind::Pylint => compiled(&PYLINT, PYLINT_PATTERN),
            RunnerKind::Pychecker => compiled(&PYCHECKER, PYCHECKER_PATTERN),
            RunnerKind::Pep8 => compiled(&PEP8, PEP8_PATTERN),
            RunnerKind::Pyflakes => compiled(&PYFLAKES, PYFLAKES_PATTERN),
            RunnerKind::Test => compiled(&TEST, TEST_PATTERN),
        }
    }

    /// Extract fields from one raw line; `None` if the line is not a finding.
    pub fn parse_line(self, line: &str) -> Option<RawMatch<'_>> {
        let caps = self.matcher().captures(line)?;
        let field = |name: &str| caps.name(name).map(|m| m.as_str().trim()).unwrap_or("");
        Some(RawMatch {
            filename: field("filename"),
            line_number: field("line_number"),
            error_type: field("error_type"),
            error_number: field("error_number"),
            context: field("context"),
            description: field("description"),
        })
    }

    /// Turn matched fields into a diagnostic, deriving its severity.
    pub fn fixup(self, raw: &RawMatch<'_>) -> Diagnostic {
        let mut error_type = raw.error_type;
        let severity = match self {
            RunnerKind::Pep8 => Severity::Info,
            RunnerKind::Pylint => match error_type.chars().next() {
                Some('E') => Severity::Error,
                Some('C') => Severity::Info,
                _ => Severity::Warning,
            },
            RunnerKind::Pyflakes => {
                // pyflakes prints no code at all
                error_type = "W";
                Severity::Warning
            }
            RunnerKind::Pychecker => Severity::Warning,
            RunnerKind::Test => {
                if raw.error_number == "fail" {
                    Severity::Error
                } else {
                    Severity::Warning
                }
            }
        };
        Diagnostic::new(
            severity,
            self.name(),
            error_type,
            raw.error_number,
            raw.description,
            raw.filename,
            raw.line_number,
        )
    }

    /// Built-in codes ignored when `use_sane_defaults` is on.
    pub fn default_ignore_codes(self) -> &'static [&'static str] {
        match self {
            RunnerKind::Pylint => PYLINT_DEFAULT_IGNORES,
            _ => &[],
        }
    }

    /// Flags passed before the target file.
    pub fn build_flags(self, ignore: &BTreeSet<String>, cfg: &Configuration) -> Vec<String> {
        let joined = ignore.iter().cloned().collect::<Vec<_>>().join(",");
        let mut flags: Vec<String> = Vec::new();
        match self {
            RunnerKind::Pylint => {
                for f in ["--output-format", "parseable", "--include-ids", "y", "--reports", "n"] {
                    flags.push(f.to_string());
                }
                if !ignore.is_empty() {
                    flags.push(format!("--disable={}", joined));
                }
            }
            RunnerKind::Pychecker => {
                for f in ["--no-deprecated", "-0186", "--only", "-#0"] {
                    flags.push(f.to_string());
                }
            }
            RunnerKind::Pep8 => {
                flags.push("--repeat".to_string());
                if !ignore.is_empty() {
                    flags.push(format!("--ignore={}", joined));
                }
            }
            RunnerKind::Pyflakes => {}
            RunnerKind::Test => flags.extend(cfg.test_runner_flags.iter().cloned()),
        }
        flags
    }

    /// Stream that carries the checker's findings.
    pub fn stream(self, cfg: &Configuration) -> OutputStream {
        match self {
            RunnerKind::Test => cfg.test_runner_output,
            _ => OutputStream::Stdout,
        }
    }
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
