//! pyflymake core library.
//!
//! Runs Python code checkers as subprocesses and normalizes their output into
//! flymake-readable diagnostic lines.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery of `.pyflymake.toml|yaml` and effective configuration.
//! - `error`: Configuration and runner error types.
//! - `ignore`: Effective ignore-code computation.
//! - `kind`: Per-checker patterns, severity fixups and flags.
//! - `runner`: Subprocess execution and streaming normalization.
//! - `lint`: Orchestration across enabled checkers.
//! - `models`: Diagnostic and settings-file data models.
//! - `output`: flymake/JSON line rendering.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod error;
pub mod ignore;
pub mod kind;
pub mod lint;
pub mod models;
pub mod output;
pub mod runner;
pub mod utils;
