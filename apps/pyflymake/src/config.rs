//! Configuration discovery and effective settings resolution.
//!
//! Starting at the directory containing the target file, pyflymake walks
//! upward looking for `.pyflymake.toml|yaml|yml`. The first file found is
//! evaluated for the invocation trigger, then every key it leaves unset is
//! filled from defaults:
//! - `pylint`, `pep8`, `pyflakes`: true; `pychecker`: false
//! - `ignore_codes`: empty; `use_sane_defaults`: true
//! - `virtualenv`, `test_runner_command`: unset
//! - `test_runner_flags`: empty; `test_runner_output`: `stderr`
//!
//! Overrides precedence: CLI > trigger table > config file > defaults.
//! The walk stops before the filesystem root, which is never searched.

use crate::error::ConfigError;
use crate::kind::RunnerKind;
use crate::models::settings::{OutputStream, SettingsFile, SettingsLayer};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Candidate file names, checked in order in every directory.
pub const CONFIG_FILES: [&str; 3] = [".pyflymake.toml", ".pyflymake.yaml", ".pyflymake.yml"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
/// Why the check was requested; selects a `[trigger.<name>]` table.
pub enum Trigger {
    Open,
    Edit,
    Save,
    #[default]
    Force,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Open => "open",
            Trigger::Edit => "edit",
            Trigger::Save => "save",
            Trigger::Force => "force",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fully-resolved configuration handed to runners. Read-only after resolution.
pub struct Configuration {
    pub virtualenv: Option<PathBuf>,
    pub ignore_codes: BTreeSet<String>,
    pub use_sane_defaults: bool,
    pub env: BTreeMap<String, String>,
    pub enabled: BTreeSet<RunnerKind>,
    pub test_runner_command: Option<String>,
    pub test_runner_flags: Vec<String>,
    pub test_runner_output: OutputStream,
    /// File the settings came from, if any.
    pub source: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from_layer(&SettingsLayer::default(), None)
    }
}

impl Configuration {
    /// Fill every key `layer` leaves unset from built-in defaults.
    pub fn from_layer(layer: &SettingsLayer, source: Option<PathBuf>) -> Self {
        let mut enabled = BTreeSet::new();
        for (kind, flag, default) in [
            (RunnerKind::Pylint, layer.pylint, true),
            (RunnerKind::Pychecker, layer.pychecker, false),
            (RunnerKind::Pep8, layer.pep8, true),
            (RunnerKind::Pyflakes, layer.pyflakes, true),
        ] {
            if flag.unwrap_or(default) {
                enabled.insert(kind);
            }
        }
        Configuration {
            virtualenv: layer.virtualenv.as_ref().map(|venv| {
                // relative to the directory holding the settings file
                match source.as_deref().and_then(Path::parent) {
                    Some(base) => normalize_path(&base.join(venv)),
                    None => PathBuf::from(venv),
                }
            }),
            ignore_codes: layer
                .ignore_codes
                .iter()
                .flatten()
                .cloned()
                .collect(),
            use_sane_defaults: layer.use_sane_defaults.unwrap_or(true),
            env: layer.env.clone().unwrap_or_default(),
            enabled,
            test_runner_command: layer
                .test_runner_command
                .clone()
                .filter(|c| !c.trim().is_empty()),
            test_runner_flags: layer.test_runner_flags.clone().unwrap_or_default(),
            test_runner_output: layer.test_runner_output.unwrap_or_default(),
            source,
        }
    }

    pub fn is_enabled(&self, kind: RunnerKind) -> bool {
        match kind {
            RunnerKind::Test => self.test_runner_command.is_some(),
            _ => self.enabled.contains(&kind),
        }
    }
}

#[derive(Debug, Default, Clone)]
/// Values supplied on the command line; applied after defaults-filling.
pub struct Overrides {
    pub virtualenv: Option<PathBuf>,
    pub ignore_codes: Option<Vec<String>>,
}

/// Parse settings text; `.yaml`/`.yml` paths use YAML, anything else TOML.
pub fn load_config_from_str(path: &Path, content: &str) -> Result<SettingsFile, ConfigError> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed = if is_yaml {
        serde_yaml::from_str::<Option<SettingsFile>>(content)
            .map(Option::unwrap_or_default)
            .map_err(|e| e.to_string())
    } else {
        toml::from_str::<SettingsFile>(content).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Load the settings file of a single directory, if it has one.
///
/// A missing file is the only tolerated read failure.
pub fn load_config(dir: &Path) -> Result<Option<(PathBuf, SettingsFile)>, ConfigError> {
    for name in CONFIG_FILES {
        let path = dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        let file = load_config_from_str(&path, &content)?;
        return Ok(Some((path, file)));
    }
    Ok(None)
}

/// Drop `.` and fold `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp.as_os_str()),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Walk upward from the directory containing `target` to the closest settings file.
pub fn find_config(target: &Path) -> Result<Option<(PathBuf, SettingsFile)>, ConfigError> {
    let mut dir = target.parent();
    while let Some(cur) = dir {
        if cur.as_os_str().is_empty() || cur.parent().is_none() {
            break;
        }
        if let Some(found) = load_config(cur)? {
            return Ok(Some(found));
        }
        dir = cur.parent();
    }
    Ok(None)
}

/// Resolve the `Configuration` for checking `target` under `trigger`.
pub fn resolve(
    target: &Path,
    trigger: Trigger,
    overrides: &Overrides,
) -> Result<Configuration, ConfigError> {
    let target = if target.is_absolute() {
        normalize_path(target)
    } else {
        normalize_path(
            &std::env::current_dir()
                .map_err(ConfigError::CurrentDir)?
                .join(target),
        )
    };
    let mut cfg = match find_config(&target)? {
        Some((path, file)) => {
            debug!(config = %path.display(), trigger = trigger.as_str(), "loaded settings");
            Configuration::from_layer(&file.for_trigger(trigger.as_str()), Some(path))
        }
        None => {
            debug!("no settings file found; using defaults");
            Configuration::default()
        }
    };
    if let Some(venv) = overrides.virtualenv.as_ref() {
        cfg.virtualenv = Some(venv.clone());
    }
    if let Some(codes) = overrides.ignore_codes.as_ref() {
        cfg.ignore_codes = codes
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
    }
    Ok(cfg)
}
