//! Error types for configuration resolution and runner execution.

use std::path::PathBuf;

/// Fatal failures while locating or loading a project configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists (or may exist) but could not be read.
    #[error("failed to read configuration {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid TOML/YAML for the settings schema.
    #[error("failed to parse configuration {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// The working directory could not be determined for a relative target.
    #[error("failed to resolve target path: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Failures of a single runner; isolated to that runner.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The checker executable could not be started.
    #[error("failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A requested pipe was not attached to the child process.
    #[error("'{0}' has no captured output pipe")]
    MissingPipe(String),
}
