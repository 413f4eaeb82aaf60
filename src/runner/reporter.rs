use crate::config::HostConfig;
use crate::output::LogSink;
use crate::runner::types::{SuiteStats, TestCaseResult, TestStatus};
use chrono::{DateTime, Local};

/// Non-passing groups, in the order the summary lists them.
const GROUPS: [(TestStatus, &str); 4] = [
    (TestStatus::Fail, "Failed"),
    (TestStatus::Error, "Errored"),
    (TestStatus::Skip, "Skipped"),
    (TestStatus::Pending, "Pending"),
];

/// Human-readable summary of a finished run.
pub struct SummaryReporter<'a> {
    name: &'a str,
    started: DateTime<Local>,
    config: &'a HostConfig,
    stats: &'a SuiteStats,
    results: &'a [TestCaseResult],
}

impl<'a> SummaryReporter<'a> {
    pub fn new(
        name: &'a str,
        started: DateTime<Local>,
        config: &'a HostConfig,
        stats: &'a SuiteStats,
        results: &'a [TestCaseResult],
    ) -> Self {
        Self {
            name,
            started,
            config,
            stats,
            results,
        }
    }

    pub fn write(&self, sink: &mut LogSink) {
        sink.notify(format!(
            "  Test Suite: {} @ {}",
            self.name,
            self.started.format("%Y-%m-%d %H:%M:%S %z")
        ));
        sink.notify("");
        sink.notify("  - Host Configuration Summary -");
        self.config.dump(sink);

        self.write_stats(sink);

        sink.notify("  - Specific Test Case Status -");
        for (status, label) in GROUPS {
            sink.notify(format!("{} Test Cases:", label));
            for result in self.results.iter().filter(|r| r.status == status) {
                sink.notify(format!("  Test Case {} {}", result.path.display(), reported(result)));
            }
        }
        sink.notify("");
        sink.notify("");
    }

    fn write_stats(&self, sink: &mut LogSink) {
        let stats = self.stats;
        sink.notify("");
        sink.notify("          - Test Case Summary -");
        sink.notify(format!("   Total Suite Time: {:.2} seconds", stats.elapsed.as_secs_f64()));
        sink.notify(format!("  Average Test Time: {:.2} seconds", stats.average().as_secs_f64()));
        sink.notify(format!("          Attempted: {}", stats.attempted));
        sink.notify(format!("             Passed: {}", stats.passed));
        sink.notify(format!("             Failed: {}", stats.failed));
        sink.notify(format!("            Errored: {}", stats.errored));
        sink.notify(format!("            Skipped: {}", stats.skipped));
        sink.notify(format!("            Pending: {}", stats.pending));
        sink.notify("");
    }
}

fn reported(result: &TestCaseResult) -> String {
    match &result.exception {
        Some(exception) => format!("reported: {}", exception.compact()),
        None => result.status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::types::TestException;
    use chrono::TimeZone;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_summary_content() {
        let results = vec![
            TestCaseResult::new("tests/ok.sh", TestStatus::Pass, Duration::from_secs(3)),
            TestCaseResult::new("tests/pending.sh", TestStatus::Pending, Duration::ZERO),
            TestCaseResult::new("tests/bad.sh", TestStatus::Fail, Duration::from_secs(1))
                .with_exception(TestException::new("Failure", "boom")),
            TestCaseResult::new("tests/skip.sh", TestStatus::Skip, Duration::ZERO),
        ];
        let stats = SuiteStats::from_results(&results);
        let config = HostConfig::default();
        let started = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("summary.txt");
        let mut sink = LogSink::new(false, false);
        sink.set_file(Some(&path)).unwrap();

        SummaryReporter::new("smoke", started, &config, &stats, &results).write(&mut sink);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("  Test Suite: smoke @ 2026-01-02 03:04:05"));
        assert!(content.contains("   Total Suite Time: 4.00 seconds"));
        assert!(content.contains("  Average Test Time: 1.00 seconds"));
        assert!(content.contains("          Attempted: 4"));
        assert!(content.contains("            Pending: 1"));

        let failed = content.find("Failed Test Cases:").unwrap();
        let bad = content.find("  Test Case tests/bad.sh reported: #<Failure: boom>").unwrap();
        let errored = content.find("Errored Test Cases:").unwrap();
        let skipped = content.find("Skipped Test Cases:").unwrap();
        let skip_line = content.find("  Test Case tests/skip.sh skip").unwrap();
        let pending = content.find("Pending Test Cases:").unwrap();
        let pending_line = content.find("  Test Case tests/pending.sh pending").unwrap();
        assert!(failed < bad && bad < errored && errored < skipped);
        assert!(skipped < skip_line && skip_line < pending && pending < pending_line);
        assert!(!content.contains("Test Case tests/ok.sh"));
    }
}
