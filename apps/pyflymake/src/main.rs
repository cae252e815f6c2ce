//! pyflymake binary entry point.
//! Resolves configuration, runs the enabled checkers and prints diagnostics.

use clap::Parser;
use pyflymake::cli::Cli;
use pyflymake::config::{self, Overrides};
use pyflymake::lint::{self, RunOptions};
use pyflymake::utils;
use std::io;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let overrides = Overrides {
        virtualenv: cli.virtualenv.clone(),
        ignore_codes: cli.ignore_codes.clone(),
    };
    let cfg = match config::resolve(&cli.file, cli.trigger, &overrides) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            std::process::exit(2);
        }
    };
    debug!(?cfg, "resolved configuration");

    let opts = RunOptions {
        output: cli.output,
        parallel: cli.parallel,
    };
    let stdout = io::stdout();
    let mut sink = stdout.lock();
    match lint::run_checks(&cli.file, &cfg, opts, &mut sink) {
        Ok(report) => {
            if cli.debug {
                for (kind, e) in &report.failures {
                    eprintln!("{} {} skipped: {}", utils::note_prefix(), kind, e);
                }
            }
            debug!(emitted = report.emitted, "done");
        }
        // the editor went away; nothing left to report to
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
        }
    }
}
