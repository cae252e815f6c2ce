//! Orchestration: run every enabled checker against one file and write the
//! normalized diagnostics to a sink.
//!
//! Runners go in declared order (test runner first, then pylint, pychecker,
//! pep8, pyflakes). A runner that cannot be launched contributes nothing
//! and the rest still run.

use crate::config::Configuration;
use crate::error::RunnerError;
use crate::kind::RunnerKind;
use crate::models::Diagnostic;
use crate::output::{render, OutputMode};
use crate::runner::Runner;
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
/// How a check run executes and renders.
pub struct RunOptions {
    pub output: OutputMode,
    /// Run checkers on the rayon pool; output order is unchanged.
    pub parallel: bool,
}

#[derive(Debug, Default)]
/// Outcome of one check run.
pub struct RunReport {
    pub emitted: usize,
    pub failures: Vec<(RunnerKind, RunnerError)>,
}

/// Runner kinds enabled by `cfg`, in execution order.
pub fn enabled_runners(cfg: &Configuration) -> Vec<RunnerKind> {
    RunnerKind::ALL
        .into_iter()
        .filter(|k| cfg.is_enabled(*k))
        .collect()
}

/// Run all enabled checkers on `target`, writing one line per diagnostic.
///
/// Only sink write errors are returned; runner failures are recorded in
/// the report.
pub fn run_checks<W: Write>(
    target: &Path,
    cfg: &Configuration,
    opts: RunOptions,
    sink: &mut W,
) -> io::Result<RunReport> {
    let kinds = enabled_runners(cfg);
    let mut report = RunReport::default();
    if opts.parallel {
        let results: Vec<(RunnerKind, Result<Vec<Diagnostic>, RunnerError>)> = kinds
            .par_iter()
            .filter_map(|kind| {
                let runner = Runner::new(*kind, cfg)?;
                Some((*kind, runner.execute(target).map(|d| d.collect::<Vec<_>>())))
            })
            .collect();
        for (kind, result) in results {
            match result {
                Ok(diags) => {
                    for d in &diags {
                        emit(sink, d, opts.output)?;
                    }
                    report.emitted += diags.len();
                }
                Err(e) => record_failure(&mut report, kind, e),
            }
        }
        return Ok(report);
    }

    for kind in kinds {
        let Some(runner) = Runner::new(kind, cfg) else {
            continue;
        };
        match runner.execute(target) {
            Ok(diags) => {
                for d in diags {
                    emit(sink, &d, opts.output)?;
                    report.emitted += 1;
                }
            }
            Err(e) => record_failure(&mut report, kind, e),
        }
    }
    Ok(report)
}

fn emit<W: Write>(sink: &mut W, d: &Diagnostic, mode: OutputMode) -> io::Result<()> {
    writeln!(sink, "{}", render(d, mode))?;
    sink.flush()
}

fn record_failure(report: &mut RunReport, kind: RunnerKind, e: RunnerError) {
    info!(tool = kind.name(), error = %e, "checker skipped");
    report.failures.push((kind, e));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::PathBuf;

    /// Sink that lets the checker continue once a line has been flushed.
    struct ReleaseOnFlush {
        buf: Vec<u8>,
        marker: PathBuf,
    }

    impl Write for ReleaseOnFlush {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            if !self.buf.is_empty() {
                fs::write(&self.marker, "")?;
            }
            Ok(())
        }
    }

    fn only_test_runner(command: &str, script: &str) -> Configuration {
        Configuration {
            enabled: BTreeSet::new(),
            test_runner_command: Some(command.into()),
            test_runner_flags: vec!["-c".into(), script.into(), "sh".into()],
            test_runner_output: crate::models::settings::OutputStream::Stdout,
            ..Configuration::default()
        }
    }

    #[test]
    fn test_enabled_runners_default_order() {
        let cfg = Configuration::default();
        assert_eq!(
            enabled_runners(&cfg),
            vec![RunnerKind::Pylint, RunnerKind::Pep8, RunnerKind::Pyflakes]
        );
    }

    #[test]
    fn test_test_runner_goes_first() {
        let mut cfg = Configuration::default();
        cfg.test_runner_command = Some("nosetests".into());
        cfg.enabled.insert(RunnerKind::Pychecker);
        assert_eq!(
            enabled_runners(&cfg),
            vec![
                RunnerKind::Test,
                RunnerKind::Pylint,
                RunnerKind::Pychecker,
                RunnerKind::Pep8,
                RunnerKind::Pyflakes
            ]
        );
    }

    #[test]
    fn test_run_checks_writes_flymake_lines() {
        let cfg = only_test_runner(
            "sh",
            r#"echo "$1:12: In test_add: fail: expected 4 got 5"
echo "ignored chatter"
echo "$1:30: In test_mul: error: TypeError""#,
        );
        let mut out: Vec<u8> = Vec::new();
        let report =
            run_checks(Path::new("test_x.py"), &cfg, RunOptions::default(), &mut out).unwrap();
        assert_eq!(report.emitted, 2);
        assert!(report.failures.is_empty());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "ERROR test/fail:expected 4 got 5 at test_x.py line 12.\n\
             WARNING test/error:TypeError at test_x.py line 30.\n"
        );
    }

    #[test]
    fn test_sequential_run_flushes_each_line_as_it_arrives() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("release");
        let mut cfg = only_test_runner(
            "sh",
            r#"echo "$1:1: In test_a: fail: first"
i=0
while [ ! -f "$RELEASE_MARK" ] && [ $i -lt 100 ]; do sleep 0.1; i=$((i+1)); done
if [ -f "$RELEASE_MARK" ]; then
  echo "$1:2: In test_b: fail: released"
else
  echo "$1:2: In test_b: fail: timed out"
fi"#,
        );
        cfg.env
            .insert("RELEASE_MARK".into(), marker.to_string_lossy().to_string());
        let mut sink = ReleaseOnFlush {
            buf: Vec::new(),
            marker,
        };
        let report = run_checks(Path::new("t.py"), &cfg, RunOptions::default(), &mut sink).unwrap();
        assert_eq!(report.emitted, 2);
        assert_eq!(
            String::from_utf8(sink.buf).unwrap(),
            "ERROR test/fail:first at t.py line 1.\n\
             ERROR test/fail:released at t.py line 2.\n"
        );
    }

    #[test]
    fn test_launch_failure_is_isolated() {
        let mut cfg = only_test_runner("pyflymake-no-such-runner", "");
        cfg.enabled.insert(RunnerKind::Pyflakes);
        let mut out: Vec<u8> = Vec::new();
        let report =
            run_checks(Path::new("x.py"), &cfg, RunOptions::default(), &mut out).unwrap();
        assert!(report
            .failures
            .iter()
            .any(|(k, e)| *k == RunnerKind::Test && matches!(e, RunnerError::Launch { .. })));
    }

    #[test]
    fn test_parallel_matches_sequential_output() {
        let cfg = only_test_runner(
            "sh",
            r#"echo "$1:1: In a: fail: one"
echo "$1:2: In b: skip: two""#,
        );
        let mut seq: Vec<u8> = Vec::new();
        run_checks(Path::new("t.py"), &cfg, RunOptions::default(), &mut seq).unwrap();
        let mut par: Vec<u8> = Vec::new();
        let opts = RunOptions {
            output: OutputMode::Flymake,
            parallel: true,
        };
        let report = run_checks(Path::new("t.py"), &cfg, opts, &mut par).unwrap();
        assert_eq!(report.emitted, 2);
        assert_eq!(seq, par);
    }

    #[test]
    fn test_json_output_one_object_per_line() {
        let cfg = only_test_runner("sh", r#"echo "$1:4: In t: fail: bad""#);
        let mut out: Vec<u8> = Vec::new();
        let opts = RunOptions {
            output: OutputMode::Json,
            parallel: false,
        };
        run_checks(Path::new("t.py"), &cfg, opts, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        let v: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(v["level"], "error");
        assert_eq!(v["filename"], "t.py");
    }
}
