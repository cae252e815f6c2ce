//! Prefixes for messages written to stderr, colored unless `NO_COLOR` is set.

use owo_colors::OwoColorize;

fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if use_colors() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if use_colors() {
        "note:".blue().bold().to_string()
    } else {
        "note:".to_string()
    }
}
