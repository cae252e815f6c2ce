//! Runner: binds one checker to a resolved configuration and streams its
//! normalized diagnostics.
//!
//! The selected stream is read line by line on the calling thread, so
//! diagnostics are available before the checker exits. The other stream is
//! drained on a helper thread (logged at debug level) so a chatty checker
//! never blocks on a full pipe. Exit status is logged, never treated as a
//! failure: checkers exit non-zero whenever they report something.

use crate::config::Configuration;
use crate::error::RunnerError;
use crate::ignore::effective_ignore_codes;
use crate::kind::RunnerKind;
use crate::models::settings::OutputStream;
use crate::models::Diagnostic;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// A checker ready to run against a target file.
pub struct Runner {
    kind: RunnerKind,
    command: String,
    flags: Vec<String>,
    env: BTreeMap<String, String>,
    stream: OutputStream,
    ignore: BTreeSet<String>,
}

impl Runner {
    /// Bind `kind` to `config`. Returns `None` when the kind has no command
    /// (an unconfigured test runner).
    pub fn new(kind: RunnerKind, config: &Configuration) -> Option<Self> {
        let command = kind.command(config)?.to_string();
        let ignore = effective_ignore_codes(
            &config.ignore_codes,
            kind.default_ignore_codes(),
            config.use_sane_defaults,
        );
        Some(Runner {
            kind,
            command,
            flags: kind.build_flags(&ignore, config),
            env: build_env(config),
            stream: kind.stream(config),
            ignore,
        })
    }

    /// Full argument vector: command, flags, then the target.
    pub fn command_line(&self, target: &Path) -> Vec<String> {
        let mut args = Vec::with_capacity(self.flags.len() + 2);
        args.push(self.command.clone());
        args.extend(self.flags.iter().cloned());
        args.push(target.to_string_lossy().to_string());
        args
    }

    /// Launch the checker on `target` and return its diagnostics as they arrive.
    pub fn execute(&self, target: &Path) -> Result<Diagnostics, RunnerError> {
        debug!(tool = self.kind.name(), args = ?self.command_line(target), "launching");
        let mut child = Command::new(&self.command)
            .args(&self.flags)
            .arg(target)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Launch {
                command: self.command.clone(),
                source,
            })?;

        let stdout = child.stdout.take().map(|s| Box::new(s) as Box<dyn Read + Send>);
        let stderr = child.stderr.take().map(|s| Box::new(s) as Box<dyn Read + Send>);
        let (selected, other, other_name) = match self.stream {
            OutputStream::Stdout => (stdout, stderr, "stderr"),
            OutputStream::Stderr => (stderr, stdout, "stdout"),
        };
        let selected = match selected {
            Some(s) => s,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunnerError::MissingPipe(self.command.clone()));
            }
        };
        let tool = self.kind.name();
        let drain = other.map(|pipe| {
            std::thread::spawn(move || {
                for line in read_lines(pipe) {
                    debug!(tool, stream = other_name, "{}", line);
                }
            })
        });

        Ok(Diagnostics {
            kind: self.kind,
            ignore: self.ignore.clone(),
            child,
            reader: Some(BufReader::new(selected)),
            drain,
        })
    }
}

/// Environment overlay for checker processes: `env` entries, then the
/// virtualenv marker and its `bin` directory prepended to `PATH`.
pub fn build_env(config: &Configuration) -> BTreeMap<String, String> {
    let mut env = config.env.clone();
    if let Some(venv) = config.virtualenv.as_ref() {
        let venv = venv.to_string_lossy().to_string();
        let path = env
            .get("PATH")
            .cloned()
            .or_else(|| std::env::var("PATH").ok())
            .unwrap_or_default();
        let path = if path.is_empty() {
            format!("{}/bin", venv)
        } else {
            format!("{}/bin:{}", venv, path)
        };
        env.insert("PATH".to_string(), path);
        env.insert("VIRTUAL_ENV".to_string(), venv);
    }
    env
}

/// Match, fix up and filter one line for `kind`.
///
/// A diagnostic is dropped when its full code or its number is ignored.
pub fn normalize_line(
    kind: RunnerKind,
    ignore: &BTreeSet<String>,
    line: &str,
) -> Option<Diagnostic> {
    let raw = kind.parse_line(line)?;
    let diag = kind.fixup(&raw);
    let code = diag.code();
    if (!code.is_empty() && ignore.contains(&code))
        || (!diag.error_number.is_empty() && ignore.contains(&diag.error_number))
    {
        return None;
    }
    Some(diag)
}

fn read_lines<R: Read>(pipe: R) -> impl Iterator<Item = String> {
    let mut reader = BufReader::new(pipe);
    std::iter::from_fn(move || {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(trim_newline(&buf)),
        }
    })
}

fn trim_newline(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

/// Lazy, single-pass stream of diagnostics from one checker process.
pub struct Diagnostics {
    kind: RunnerKind,
    ignore: BTreeSet<String>,
    child: Child,
    reader: Option<BufReader<Box<dyn Read + Send>>>,
    drain: Option<JoinHandle<()>>,
}

impl Diagnostics {
    fn finish(&mut self) {
        // closing our end first lets a checker that is still writing exit
        if self.reader.take().is_none() {
            return;
        }
        if let Some(handle) = self.drain.take() {
            let _ = handle.join();
        }
        match self.child.wait() {
            Ok(status) => debug!(tool = self.kind.name(), %status, "checker exited"),
            Err(e) => warn!(tool = self.kind.name(), error = %e, "failed to wait for checker"),
        }
    }
}

impl Iterator for Diagnostics {
    type Item = Diagnostic;

    fn next(&mut self) -> Option<Diagnostic> {
        loop {
            let reader = self.reader.as_mut()?;
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    self.finish();
                    return None;
                }
                Ok(_) => {
                    let line = trim_newline(&buf);
                    if let Some(diag) = normalize_line(self.kind, &self.ignore, &line) {
                        return Some(diag);
                    }
                    debug!(tool = self.kind.name(), "unmatched: {}", line);
                }
                Err(e) => {
                    warn!(tool = self.kind.name(), error = %e, "failed reading checker output");
                    self.finish();
                    return None;
                }
            }
        }
    }
}

impl Drop for Diagnostics {
    fn drop(&mut self) {
        self.finish();
    }
}
