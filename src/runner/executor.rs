use crate::config::{Host, HostConfig, Options};
use crate::runner::types::{TestCaseResult, TestException, TestStatus};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Instant;

/// Exit code a test uses to report itself as skipped.
pub const EXIT_SKIP: i32 = 77;
/// Exit code a test uses to report itself as pending.
pub const EXIT_PENDING: i32 = 78;
/// Exit code of an assertion failure. Any other non-zero code is an error.
pub const EXIT_FAIL: i32 = 1;

/// Runs a single test file against the hosts.
///
/// Outcomes, including failures, are returned as data; implementations
/// should not panic on a broken test.
pub trait TestCaseExecutor {
    fn run_test(&self, hosts: &[Host], config: &HostConfig, options: &Options, path: &Path) -> TestCaseResult;
}

/// Executes each test file as a child process.
pub struct CommandExecutor {
    runner: Option<Vec<String>>,
}

impl CommandExecutor {
    pub fn new(runner: Option<Vec<String>>) -> Self {
        Self { runner }
    }

    pub fn from_options(options: &Options) -> Self {
        Self::new(options.runner_command())
    }

    fn command(&self, path: &Path) -> Command {
        match self.runner.as_deref() {
            Some([program, args @ ..]) => {
                let mut cmd = Command::new(program);
                cmd.args(args).arg(path);
                cmd
            }
            _ => Command::new(launch_path(path)),
        }
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TestCaseExecutor for CommandExecutor {
    fn run_test(&self, hosts: &[Host], config: &HostConfig, _options: &Options, path: &Path) -> TestCaseResult {
        let host_names = hosts.iter().map(|h| h.name.as_str()).collect::<Vec<_>>().join(",");

        let mut cmd = self.command(path);
        cmd.env("STAGEHAND_HOSTS", host_names)
            .env("STAGEHAND_TEST_FILE", path);
        if let Some(source) = &config.source {
            cmd.env("STAGEHAND_CONFIG", source);
        }

        let start = Instant::now();
        match cmd.output() {
            Ok(output) => classify(path, output, start),
            Err(e) => TestCaseResult::new(path, TestStatus::Error, start.elapsed())
                .with_exception(TestException::new("SpawnError", format!("failed to start: {}", e))),
        }
    }
}

/// A bare file name would go through a PATH lookup, so anchor it to the
/// working directory.
fn launch_path(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() && path.is_relative() => Path::new(".").join(path),
        _ => path.to_path_buf(),
    }
}

fn classify(path: &Path, output: Output, start: Instant) -> TestCaseResult {
    let runtime = start.elapsed();
    let stdout = captured(&output.stdout);
    let stderr = captured(&output.stderr);

    let (status, description) = match output.status.code() {
        Some(0) => (TestStatus::Pass, None),
        Some(EXIT_SKIP) => (TestStatus::Skip, None),
        Some(EXIT_PENDING) => (TestStatus::Pending, None),
        Some(EXIT_FAIL) => (TestStatus::Fail, Some(format!("exited with status {}", EXIT_FAIL))),
        Some(code) => (TestStatus::Error, Some(format!("exited with status {}", code))),
        None => (TestStatus::Error, Some("terminated by signal".to_string())),
    };

    let mut result = TestCaseResult::new(path, status, runtime);
    if let Some(description) = description {
        let lines: Vec<String> = stderr
            .as_deref()
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default();
        let message = lines
            .iter()
            .rev()
            .find(|l| !l.trim().is_empty())
            .cloned()
            .unwrap_or(description);
        let kind = if status == TestStatus::Fail { "Failure" } else { "ExitStatus" };
        result = result.with_exception(TestException::new(kind, message).with_backtrace(lines));
    }

    result.with_output(stdout, stderr)
}

fn captured(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}
