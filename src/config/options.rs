use crate::Result;
use crate::error::StagehandError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How test files are ordered: `random = true` shuffles with a fresh seed,
/// `random = 1234` shuffles with that seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RandomSetting {
    Enabled(bool),
    Seed(u64),
}

impl Default for RandomSetting {
    fn default() -> Self {
        RandomSetting::Enabled(false)
    }
}

impl RandomSetting {
    /// The seed to shuffle with, or `None` for lexicographic order.
    /// A bare `true` is resolved against the current Unix timestamp.
    pub fn resolve_seed(&self) -> Option<u64> {
        match self {
            RandomSetting::Enabled(false) => None,
            RandomSetting::Enabled(true) => Some(chrono::Local::now().timestamp().unsigned_abs()),
            RandomSetting::Seed(seed) => Some(*seed),
        }
    }
}

/// Runner options, read from `stagehand.toml` and overridden from the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Test roots: files are taken verbatim, directories are walked.
    #[serde(deserialize_with = "one_or_many")]
    pub tests: Vec<PathBuf>,

    pub random: RandomSetting,

    /// Write `<junit_dir>/<suite>.xml` after the run.
    pub xml: bool,

    /// Keep stdout quiet outside of the summary.
    pub quiet: bool,

    /// Skip the per-run log file.
    pub stdout_only: bool,

    /// Echo debug-level lines (skipped tests) to stdout.
    pub verbose: bool,

    /// Host configuration file (YAML).
    pub config: Option<PathBuf>,

    pub log_dir: PathBuf,

    pub junit_dir: PathBuf,

    /// Command used to launch each test file, e.g. `"sh"` or `"ruby -w"`.
    /// Test files are executed directly when unset.
    pub runner: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tests: vec![PathBuf::from("tests")],
            random: RandomSetting::default(),
            xml: false,
            quiet: false,
            stdout_only: false,
            verbose: false,
            config: None,
            log_dir: PathBuf::from("log"),
            junit_dir: PathBuf::from("junit"),
            runner: None,
        }
    }
}

impl Options {
    pub fn runner_command(&self) -> Option<Vec<String>> {
        let parts: Vec<String> = self
            .runner
            .as_deref()?
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if parts.is_empty() { None } else { Some(parts) }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<PathBuf>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    })
}

/// Options file loader
pub struct OptionsLoader;

impl OptionsLoader {
    const CONFIG_FILE: &'static str = "stagehand.toml";

    /// Load options from the given file
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Options> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            StagehandError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Find and load the options file.
    /// Lookup order:
    /// 1. current directory and its parents
    /// 2. ~/.config/stagehand/
    pub fn find_and_load() -> Result<Option<Options>> {
        match Self::find() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading options file");
                Self::load_from_path(path).map(Some)
            }
            None => Ok(None),
        }
    }

    fn find() -> Option<PathBuf> {
        if let Ok(mut current) = std::env::current_dir() {
            loop {
                let candidate = current.join(Self::CONFIG_FILE);
                if candidate.is_file() {
                    return Some(candidate);
                }
                if !current.pop() {
                    break;
                }
            }
        }

        let home = dirs::home_dir()?;
        let candidate = home.join(".config").join("stagehand").join(Self::CONFIG_FILE);
        candidate.is_file().then_some(candidate)
    }
}
