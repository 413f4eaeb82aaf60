use crate::Result;
use crate::error::StagehandError;
use colored::Colorize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Notify,
    Success,
    Warn,
    Error,
}

/// Leveled output for one suite run.
///
/// Every line goes to the file target when one is set, and to stdout when
/// echo is on. Debug lines only reach stdout in verbose mode.
pub struct LogSink {
    file: Option<File>,
    file_path: Option<PathBuf>,
    stdout: bool,
    verbose: bool,
}

impl LogSink {
    pub fn new(stdout: bool, verbose: bool) -> Self {
        Self {
            file: None,
            file_path: None,
            stdout,
            verbose,
        }
    }

    /// Point the file target at `path` (appending), or disable it with `None`.
    pub fn set_file(&mut self, path: Option<&Path>) -> Result<()> {
        self.file = None;
        self.file_path = None;

        if let Some(path) = path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(StagehandError::IoError)?;
            self.file = Some(file);
            self.file_path = Some(path.to_path_buf());
        }
        Ok(())
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn set_stdout(&mut self, stdout: bool) {
        self.stdout = stdout;
    }

    pub fn debug(&mut self, msg: impl AsRef<str>) {
        self.log(Level::Debug, msg.as_ref());
    }

    pub fn notify(&mut self, msg: impl AsRef<str>) {
        self.log(Level::Notify, msg.as_ref());
    }

    pub fn success(&mut self, msg: impl AsRef<str>) {
        self.log(Level::Success, msg.as_ref());
    }

    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.log(Level::Warn, msg.as_ref());
    }

    pub fn error(&mut self, msg: impl AsRef<str>) {
        self.log(Level::Error, msg.as_ref());
    }

    pub fn log(&mut self, level: Level, msg: &str) {
        if let Some(file) = self.file.as_mut()
            && let Err(e) = writeln!(file, "{}", msg)
        {
            tracing::warn!(
                path = ?self.file_path,
                "failed to write log file, disabling it: {}",
                e
            );
            self.file = None;
            self.file_path = None;
        }

        if !self.stdout || (level == Level::Debug && !self.verbose) {
            return;
        }

        match level {
            Level::Debug => println!("{}", msg.dimmed()),
            Level::Notify => println!("{}", msg),
            Level::Success => println!("{}", msg.green()),
            Level::Warn => println!("{}", msg.yellow()),
            Level::Error => println!("{}", msg.red()),
        }
    }
}
