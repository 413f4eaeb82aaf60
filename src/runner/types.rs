use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a single test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
    Skip,
    Pending,
}

impl TestStatus {
    /// Fail and error both count against the suite.
    pub fn is_failure(&self) -> bool {
        match self {
            TestStatus::Fail | TestStatus::Error => true,
            TestStatus::Pass | TestStatus::Skip | TestStatus::Pending => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
            TestStatus::Error => "error",
            TestStatus::Skip => "skip",
            TestStatus::Pending => "pending",
        }
    }

    /// Past-tense form used in the per-case log line.
    pub fn past_tense(&self) -> &'static str {
        match self {
            TestStatus::Pass => "passed",
            TestStatus::Fail => "failed",
            TestStatus::Error => "errored",
            TestStatus::Skip => "skipped",
            TestStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure detail captured from a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestException {
    /// Short classification, e.g. `Failure` or `ExitStatus`
    pub kind: String,
    pub message: String,
    pub backtrace: Vec<String>,
}

impl TestException {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            backtrace: Vec::new(),
        }
    }

    pub fn with_backtrace(mut self, backtrace: Vec<String>) -> Self {
        self.backtrace = backtrace;
        self
    }

    /// One-line rendering for the summary.
    pub fn compact(&self) -> String {
        format!("#<{}: {}>", self.kind, self.message)
    }
}

impl fmt::Display for TestException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of executing one test file
#[derive(Debug, Clone)]
pub struct TestCaseResult {
    pub path: PathBuf,
    pub status: TestStatus,
    pub runtime: Duration,
    pub exception: Option<TestException>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl TestCaseResult {
    pub fn new(path: impl Into<PathBuf>, status: TestStatus, runtime: Duration) -> Self {
        Self {
            path: path.into(),
            status,
            runtime,
            exception: None,
            stdout: None,
            stderr: None,
        }
    }

    pub fn with_exception(mut self, exception: TestException) -> Self {
        self.exception = Some(exception);
        self
    }

    pub fn with_output(mut self, stdout: Option<String>, stderr: Option<String>) -> Self {
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }
}

/// Aggregate statistics, computed once the run is over
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteStats {
    pub attempted: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
    pub pending: usize,
    pub elapsed: Duration,
}

impl SuiteStats {
    pub fn from_results(results: &[TestCaseResult]) -> Self {
        let mut stats = SuiteStats {
            attempted: results.len(),
            elapsed: results.iter().map(|r| r.runtime).sum(),
            ..Default::default()
        };

        for result in results {
            match result.status {
                TestStatus::Pass => stats.passed += 1,
                TestStatus::Fail => stats.failed += 1,
                TestStatus::Error => stats.errored += 1,
                TestStatus::Skip => stats.skipped += 1,
                TestStatus::Pending => stats.pending += 1,
            }
        }

        stats
    }

    pub fn success(&self) -> bool {
        self.failed + self.errored == 0
    }

    pub fn average(&self) -> Duration {
        if self.attempted == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.elapsed.as_secs_f64() / self.attempted as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TestStatus; 5] = [
        TestStatus::Pass,
        TestStatus::Fail,
        TestStatus::Error,
        TestStatus::Skip,
        TestStatus::Pending,
    ];

    fn result(status: TestStatus, millis: u64) -> TestCaseResult {
        TestCaseResult::new("tests/case.sh", status, Duration::from_millis(millis))
    }

    #[test]
    fn test_stats_counts_and_elapsed() {
        let results = vec![
            result(TestStatus::Pass, 100),
            result(TestStatus::Fail, 200),
            result(TestStatus::Skip, 0),
            result(TestStatus::Pass, 300),
        ];

        let stats = SuiteStats::from_results(&results);
        assert_eq!(stats.attempted, 4);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.elapsed, Duration::from_millis(600));
        assert_eq!(stats.average(), Duration::from_millis(150));
        assert!(!stats.success());
    }

    #[test]
    fn test_counts_always_sum_to_attempted() {
        for a in ALL {
            for b in ALL {
                for c in ALL {
                    let results = vec![result(a, 1), result(b, 1), result(c, 1)];
                    let stats = SuiteStats::from_results(&results);
                    assert_eq!(
                        stats.passed + stats.failed + stats.errored + stats.skipped + stats.pending,
                        stats.attempted
                    );
                    let expected = ![a, b, c].iter().any(|s| s.is_failure());
                    assert_eq!(stats.success(), expected);
                    assert_eq!(stats.success(), stats.failed == 0 && stats.errored == 0);
                }
            }
        }
    }

    #[test]
    fn test_empty_average() {
        assert_eq!(SuiteStats::from_results(&[]).average(), Duration::ZERO);
    }

    #[test]
    fn test_average_over_many_cases() {
        let results = vec![result(TestStatus::Pass, 1000), result(TestStatus::Pass, 0), result(TestStatus::Pass, 0)];
        let average = SuiteStats::from_results(&results).average();
        assert_eq!(average.as_millis(), 333);

        let stats = SuiteStats {
            attempted: u32::MAX as usize + 2,
            elapsed: Duration::from_secs(1),
            ..Default::default()
        };
        assert!(stats.average() < Duration::from_micros(1));
    }

    #[test]
    fn test_exception_rendering() {
        let exception = TestException::new("Failure", "boom");
        assert_eq!(exception.to_string(), "boom");
        assert_eq!(exception.compact(), "#<Failure: boom>");
    }
}
