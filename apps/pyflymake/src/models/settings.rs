//! Schema of the project configuration file (`.pyflymake.toml|yaml|yml`).
//!
//! Every key is optional. The file is a base layer plus optional
//! `[trigger.<name>]` tables carrying the same keys; the table whose name
//! matches the invocation trigger is laid over the base:
//!
//! ```toml
//! ignore_codes = ["C0301"]
//! pychecker = false
//!
//! [env]
//! DJANGO_SETTINGS_MODULE = "site.settings"
//!
//! [trigger.save]
//! pychecker = true
//! test_runner_command = "nosetests"
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Process stream a tool writes its findings to.
pub enum OutputStream {
    Stdout,
    #[default]
    Stderr,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
/// One layer of settings; `None` means "not set here".
pub struct SettingsLayer {
    pub virtualenv: Option<String>,
    pub ignore_codes: Option<Vec<String>>,
    pub use_sane_defaults: Option<bool>,
    pub env: Option<BTreeMap<String, String>>,
    pub pylint: Option<bool>,
    pub pychecker: Option<bool>,
    pub pep8: Option<bool>,
    pub pyflakes: Option<bool>,
    pub test_runner_command: Option<String>,
    pub test_runner_flags: Option<Vec<String>>,
    pub test_runner_output: Option<OutputStream>,
}

impl SettingsLayer {
    /// Lay `top` over `self`: keys set in `top` win, `env` merges per key.
    pub fn overlay(mut self, top: &SettingsLayer) -> SettingsLayer {
        if top.virtualenv.is_some() {
            self.virtualenv = top.virtualenv.clone();
        }
        if top.ignore_codes.is_some() {
            self.ignore_codes = top.ignore_codes.clone();
        }
        self.use_sane_defaults = top.use_sane_defaults.or(self.use_sane_defaults);
        if let Some(extra) = top.env.as_ref() {
            let env = self.env.get_or_insert_with(BTreeMap::new);
            env.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        self.pylint = top.pylint.or(self.pylint);
        self.pychecker = top.pychecker.or(self.pychecker);
        self.pep8 = top.pep8.or(self.pep8);
        self.pyflakes = top.pyflakes.or(self.pyflakes);
        if top.test_runner_command.is_some() {
            self.test_runner_command = top.test_runner_command.clone();
        }
        if top.test_runner_flags.is_some() {
            self.test_runner_flags = top.test_runner_flags.clone();
        }
        self.test_runner_output = top.test_runner_output.or(self.test_runner_output);
        self
    }
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
/// Root of a project configuration file.
pub struct SettingsFile {
    #[serde(flatten)]
    pub base: SettingsLayer,
    #[serde(default)]
    pub trigger: HashMap<String, SettingsLayer>, // [trigger.<open|edit|save|force>]
}

impl SettingsFile {
    /// Settings in effect for `trigger`: the base with its trigger table on top.
    pub fn for_trigger(&self, trigger: &str) -> SettingsLayer {
        match self.trigger.get(trigger) {
            Some(layer) => self.base.clone().overlay(layer),
            None => self.base.clone(),
        }
    }
}
