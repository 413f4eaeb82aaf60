use crate::Result;
use crate::config::{Host, HostConfig, Options};
use crate::error::StagehandError;
use crate::output::{LogDir, LogSink};
use crate::runner::discovery;
use crate::runner::executor::{CommandExecutor, TestCaseExecutor};
use crate::runner::junit::JunitReport;
use crate::runner::reporter::SummaryReporter;
use crate::runner::types::{SuiteStats, TestCaseResult, TestStatus};
use chrono::{DateTime, Local};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

/// Collapse every whitespace run into a single `-`.
pub fn normalize_name(name: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").unwrap());
    re.replace_all(name, "-").into_owned()
}

/// Log sink and log directory of a single run.
struct RunContext {
    sink: LogSink,
    log_dir: LogDir,
    started: DateTime<Local>,
}

/// An ordered set of test files run once, sequentially, against a host list.
///
/// A suite is not meant to be shared: it owns its log output and writes
/// into directories relative to the options it was built with.
pub struct Suite {
    name: String,
    hosts: Vec<Host>,
    options: Options,
    config: HostConfig,
    stop_on_error: bool,
    test_files: Vec<PathBuf>,
    random_seed: Option<u64>,
    executor: Box<dyn TestCaseExecutor>,
    has_run: bool,
    results: Vec<TestCaseResult>,
    stats: Option<SuiteStats>,
    context: Option<RunContext>,
}

impl Suite {
    /// Discover and order the test files. Fails when nothing is found.
    pub fn new(
        name: &str,
        hosts: Vec<Host>,
        options: Options,
        config: HostConfig,
        stop_on_error: bool,
    ) -> Result<Self> {
        let files = discovery::discover(&options.tests)?;
        let random_seed = options.random.resolve_seed();
        let test_files = discovery::order(files, random_seed);
        let executor = Box::new(CommandExecutor::from_options(&options));

        Ok(Self {
            name: normalize_name(name),
            hosts,
            options,
            config,
            stop_on_error,
            test_files,
            random_seed,
            executor,
            has_run: false,
            results: Vec::new(),
            stats: None,
            context: None,
        })
    }

    /// Replace the default subprocess executor.
    pub fn with_executor(mut self, executor: impl TestCaseExecutor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn stop_on_error(&self) -> bool {
        self.stop_on_error
    }

    pub fn test_files(&self) -> &[PathBuf] {
        &self.test_files
    }

    /// Seed of the shuffled order; re-supply it to reproduce a run.
    pub fn random_seed(&self) -> Option<u64> {
        self.random_seed
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    /// Execute every test file once, in order, then summarize and export.
    ///
    /// Test failures are recorded, not returned. With `stop_on_error` the
    /// loop ends at the first fail or error and later files never run.
    pub fn run(&mut self) -> Result<&Self> {
        if self.has_run {
            return Err(StagehandError::Precondition(format!(
                "suite {} has already been run",
                self.name
            )));
        }
        self.has_run = true;

        let started = Local::now();
        let mut context = RunContext {
            sink: LogSink::new(!self.options.quiet, self.options.verbose),
            log_dir: LogDir::new(self.options.log_dir.clone(), started, self.config.source.clone()),
            started,
        };
        self.initialize_logfile(&mut context);

        let sink = &mut context.sink;
        if let Some(seed) = self.random_seed {
            sink.notify(format!("Using random seed {}", seed));
        }

        for path in &self.test_files {
            sink.notify("");
            sink.notify(format!("Begin {}", path.display()));

            let start = Instant::now();
            let result = self
                .executor
                .run_test(&self.hosts, &self.config, &self.options, path);
            let duration = start.elapsed();
            let status = result.status;
            self.results.push(result);

            let msg = format!(
                "{} {} in {:.2} seconds",
                path.display(),
                status.past_tense(),
                duration.as_secs_f64()
            );
            match status {
                TestStatus::Pass => sink.success(msg),
                TestStatus::Skip => sink.debug(msg),
                TestStatus::Fail => sink.error(msg),
                TestStatus::Error => sink.warn(msg),
                TestStatus::Pending => sink.notify(msg),
            }

            if status.is_failure() && self.stop_on_error {
                tracing::debug!(path = %path.display(), "stopping on first failure");
                break;
            }
        }

        self.stats = Some(SuiteStats::from_results(&self.results));
        self.context = Some(context);

        self.summarize()?;
        if self.options.xml {
            self.export_junit();
        }

        Ok(&*self)
    }

    /// Run, then turn an unsuccessful suite into a `SuiteFailed` error.
    /// Exiting the process is left to the caller.
    pub fn run_and_check(&mut self) -> Result<&Self> {
        self.run()?;
        if self.success()? {
            return Ok(&*self);
        }

        let msg = format!("Failed while running the {} suite...", self.name);
        if let Some(context) = self.context.as_mut() {
            context.sink.error(&msg);
        }
        Err(StagehandError::SuiteFailed {
            name: self.name.clone(),
        })
    }

    /// Write the summary to stdout and, when file logging is on, to
    /// `<name>-summary.txt` in the run's log directory.
    pub fn summarize(&mut self) -> Result<()> {
        let stats = self.stats.as_ref().ok_or_else(StagehandError::not_run)?;
        let context = self.context.as_mut().ok_or_else(StagehandError::not_run)?;
        let sink = &mut context.sink;

        if sink.has_file() {
            let retarget = context
                .log_dir
                .path_for(&format!("{}-summary.txt", self.name))
                .and_then(|path| sink.set_file(Some(&path)));
            if let Err(e) = retarget {
                tracing::warn!("cannot write summary file: {}", e);
            }
        }
        sink.set_stdout(true);

        SummaryReporter::new(&self.name, context.started, &self.config, stats, &self.results).write(sink);

        sink.set_stdout(!self.options.quiet);
        sink.set_file(None)
    }

    /// Write `<junit_dir>/<name>.xml`, returning the file written.
    pub fn write_junit_xml(&self) -> Result<PathBuf> {
        let stats = self.stats()?;
        JunitReport::new(&self.name, stats, &self.results).write_to(&self.options.junit_dir)
    }

    /// Export failures are reported and dropped so they never affect the
    /// recorded outcome.
    fn export_junit(&mut self) {
        match self.write_junit_xml() {
            Ok(path) => tracing::debug!(path = %path.display(), "wrote JUnit report"),
            Err(e) => {
                tracing::debug!("failure in XML output: {:?}", e);
                if let Some(context) = self.context.as_mut() {
                    context.sink.error(format!("failure in XML output:\n{}\n{:?}", e, e));
                }
            }
        }
    }

    fn initialize_logfile(&self, context: &mut RunContext) {
        if self.options.stdout_only {
            return;
        }

        let sink = &mut context.sink;
        let target = context
            .log_dir
            .path_for(&format!("{}-run.log", self.name))
            .and_then(|path| sink.set_file(Some(&path)));
        if let Err(e) = target {
            tracing::warn!("cannot write run log, logging to stdout only: {}", e);
        }
    }

    /// Directory holding this run's log files, once the run has started.
    pub fn log_dir(&self) -> Option<&Path> {
        self.context.as_ref().map(|c| c.log_dir.run_dir())
    }

    pub fn stats(&self) -> Result<&SuiteStats> {
        self.stats.as_ref().ok_or_else(StagehandError::not_run)
    }

    pub fn results(&self) -> Result<&[TestCaseResult]> {
        self.stats()?;
        Ok(&self.results)
    }

    pub fn success(&self) -> Result<bool> {
        Ok(self.stats()?.success())
    }

    pub fn failed(&self) -> Result<bool> {
        Ok(!self.success()?)
    }

    pub fn test_count(&self) -> Result<usize> {
        Ok(self.stats()?.attempted)
    }

    pub fn passed_tests(&self) -> Result<usize> {
        Ok(self.stats()?.passed)
    }

    pub fn failed_tests(&self) -> Result<usize> {
        Ok(self.stats()?.failed)
    }

    pub fn errored_tests(&self) -> Result<usize> {
        Ok(self.stats()?.errored)
    }

    pub fn skipped_tests(&self) -> Result<usize> {
        Ok(self.stats()?.skipped)
    }

    pub fn pending_tests(&self) -> Result<usize> {
        Ok(self.stats()?.pending)
    }
}
