use crate::Result;
use crate::error::StagehandError;
use chrono::{DateTime, Local};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const LATEST_LINK: &str = "latest";
const CONFIG_COPY: &str = "config.yml";

/// Timestamped log directory of one suite run, created on first use.
///
/// ```text
/// <root>/<YYYY-MM-DD_HH:MM:SS>/
/// <root>/<YYYY-MM-DD_HH:MM:SS>/config.yml
/// <root>/latest -> <YYYY-MM-DD_HH:MM:SS>
/// ```
#[derive(Debug, Clone)]
pub struct LogDir {
    root: PathBuf,
    run_dir: PathBuf,
    config_source: Option<PathBuf>,
}

impl LogDir {
    pub fn new(root: impl Into<PathBuf>, started: DateTime<Local>, config_source: Option<PathBuf>) -> Self {
        let root = root.into();
        let run_dir = root.join(started.format("%F_%T").to_string());
        Self {
            root,
            run_dir,
            config_source,
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Path of `name` inside the run directory, creating the directory first.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        self.ensure()?;
        Ok(self.run_dir.join(name))
    }

    fn ensure(&self) -> Result<()> {
        if self.run_dir.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(&self.run_dir).map_err(StagehandError::IoError)?;
        tracing::debug!(dir = %self.run_dir.display(), "created log directory");

        if let Some(source) = &self.config_source {
            fs::copy(source, self.run_dir.join(CONFIG_COPY)).map_err(StagehandError::IoError)?;
        }

        self.update_latest()
    }

    /// Repoint `<root>/latest` unless something other than a symlink owns the name.
    fn update_latest(&self) -> Result<()> {
        let latest = self.root.join(LATEST_LINK);
        match fs::symlink_metadata(&latest) {
            Ok(meta) if meta.file_type().is_symlink() => {
                fs::remove_file(&latest).map_err(StagehandError::IoError)?;
            }
            Ok(_) => {
                tracing::warn!(path = %latest.display(), "not a symlink, leaving it alone");
                return Ok(());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StagehandError::IoError(e)),
        }

        let Some(target) = self.run_dir.file_name() else {
            return Ok(());
        };
        link(Path::new(target), &latest)
    }
}

#[cfg(unix)]
fn link(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(StagehandError::IoError)
}

#[cfg(not(unix))]
fn link(_target: &Path, link: &Path) -> Result<()> {
    tracing::debug!(path = %link.display(), "symlinks unsupported on this platform");
    Ok(())
}
