//! CLI argument parsing via `clap`.

use crate::config::Trigger;
use crate::output::OutputMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pyflymake",
    version,
    about = "Run Python checkers and print flymake-readable diagnostics",
    long_about = "pyflymake runs pylint, pychecker, pep8, pyflakes and an optional test runner on one file and prints their findings as flymake lines.\n\nConfiguration precedence: CLI > .pyflymake.toml (closest ancestor) > defaults.",
    after_help = "Examples:\n  pyflymake src/app/views.py\n  pyflymake -t save -e ~/.venvs/app src/app/views.py\n  pyflymake -i C0111,E501 --output json models.py",
    arg_required_else_help = true
)]
/// Command-line options.
pub struct Cli {
    #[arg(help = "Python file to check")]
    pub file: PathBuf,
    #[arg(short = 'e', long, help = "Virtualenv directory (overrides config)")]
    pub virtualenv: Option<PathBuf>,
    #[arg(
        short = 't',
        long = "trigger",
        value_enum,
        default_value_t = Trigger::Force,
        help = "Why the check runs; selects [trigger.<name>] settings"
    )]
    pub trigger: Trigger,
    #[arg(
        short = 'i',
        long,
        value_delimiter = ',',
        help = "Comma-separated codes to ignore (overrides config)"
    )]
    pub ignore_codes: Option<Vec<String>>,
    #[arg(short = 'd', long, action = clap::ArgAction::SetTrue, help = "Log debug output to stderr")]
    pub debug: bool,
    #[arg(long, value_enum, default_value_t = OutputMode::Flymake, help = "Output mode: flymake|json")]
    pub output: OutputMode,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Run checkers in parallel (output order unchanged)")]
    pub parallel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "pyflymake",
            "-e",
            "/srv/venv",
            "-t",
            "save",
            "-i",
            "C0111,E501",
            "-d",
            "views.py",
        ])
        .unwrap();
        assert_eq!(cli.file, PathBuf::from("views.py"));
        assert_eq!(cli.virtualenv, Some(PathBuf::from("/srv/venv")));
        assert_eq!(cli.trigger, Trigger::Save);
        assert_eq!(
            cli.ignore_codes,
            Some(vec!["C0111".to_string(), "E501".to_string()])
        );
        assert!(cli.debug);
        assert_eq!(cli.output, OutputMode::Flymake);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pyflymake", "a.py"]).unwrap();
        assert_eq!(cli.trigger, Trigger::Force);
        assert!(cli.ignore_codes.is_none());
        assert!(!cli.parallel);
    }

    #[test]
    fn test_rejects_unknown_trigger() {
        assert!(Cli::try_parse_from(["pyflymake", "-t", "later", "a.py"]).is_err());
    }
}
