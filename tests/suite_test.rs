use stagehand::config::{Host, HostConfig, Options, RandomSetting};
use stagehand::runner::TestException;
use stagehand::{StagehandError, Suite, TestCaseExecutor, TestCaseResult, TestStatus};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tempfile::TempDir;

/// Maps a file name prefix to a status and records every call.
#[derive(Clone, Default)]
struct ScriptedExecutor {
    calls: Rc<RefCell<Vec<PathBuf>>>,
}

impl TestCaseExecutor for ScriptedExecutor {
    fn run_test(&self, _hosts: &[Host], _config: &HostConfig, _options: &Options, path: &Path) -> TestCaseResult {
        self.calls.borrow_mut().push(path.to_path_buf());

        let name = path.file_name().unwrap().to_string_lossy();
        let status = if name.contains("fail") {
            TestStatus::Fail
        } else if name.contains("error") {
            TestStatus::Error
        } else if name.contains("skip") {
            TestStatus::Skip
        } else if name.contains("pending") {
            TestStatus::Pending
        } else {
            TestStatus::Pass
        };

        let mut result = TestCaseResult::new(path, status, Duration::from_millis(10));
        if status.is_failure() {
            result = result.with_exception(TestException::new("Failure", "boom"));
        }
        result
    }
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(files: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("tests")).unwrap();
        for file in files {
            fs::write(dir.path().join("tests").join(file), "exit 0\n").unwrap();
        }
        Self { dir }
    }

    fn options(&self) -> Options {
        Options {
            tests: vec![self.dir.path().join("tests")],
            quiet: true,
            log_dir: self.dir.path().join("log"),
            junit_dir: self.dir.path().join("junit"),
            ..Options::default()
        }
    }

    fn suite(&self, options: Options, stop_on_error: bool) -> (Suite, ScriptedExecutor) {
        let executor = ScriptedExecutor::default();
        let suite = Suite::new("nightly acceptance", vec![], options, HostConfig::default(), stop_on_error)
            .unwrap()
            .with_executor(executor.clone());
        (suite, executor)
    }
}

const MIXED: [&str; 5] = ["01_pass", "02_fail", "03_skip", "04_error", "05_pending"];

#[test]
fn test_runs_every_file_without_stop_on_error() {
    let ws = Workspace::new(&MIXED);
    let (mut suite, executor) = ws.suite(ws.options(), false);

    suite.run().unwrap();

    assert_eq!(executor.calls.borrow().len(), 5);
    assert_eq!(suite.test_count().unwrap(), suite.test_files().len());
    assert_eq!(suite.passed_tests().unwrap(), 1);
    assert_eq!(suite.failed_tests().unwrap(), 1);
    assert_eq!(suite.errored_tests().unwrap(), 1);
    assert_eq!(suite.skipped_tests().unwrap(), 1);
    assert_eq!(suite.pending_tests().unwrap(), 1);
    assert!(!suite.success().unwrap());
    assert!(suite.failed().unwrap());
}

#[test]
fn test_stop_on_error_truncates_at_first_failure() {
    let ws = Workspace::new(&MIXED);
    let (mut suite, executor) = ws.suite(ws.options(), true);

    suite.run().unwrap();

    let calls = executor.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].ends_with("02_fail"));

    let results = suite.results().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.len() < suite.test_files().len());
    assert_eq!(results[1].status, TestStatus::Fail);
}

#[test]
fn test_stop_on_error_stops_on_error_status() {
    let ws = Workspace::new(&["01_pass", "02_error", "03_pass"]);
    let (mut suite, executor) = ws.suite(ws.options(), true);

    suite.run().unwrap();
    assert_eq!(executor.calls.borrow().len(), 2);
    assert_eq!(suite.errored_tests().unwrap(), 1);
}

#[test]
fn test_stop_on_error_without_failures_runs_everything() {
    let ws = Workspace::new(&["a_pass", "b_skip", "c_pending", "d_pass"]);
    let (mut suite, _) = ws.suite(ws.options(), true);

    suite.run().unwrap();
    assert_eq!(suite.test_count().unwrap(), 4);
    assert!(suite.success().unwrap());
}

#[test]
fn test_accessors_require_a_run() {
    let ws = Workspace::new(&["01_pass"]);
    let (mut suite, _) = ws.suite(ws.options(), false);

    assert!(!suite.has_run());
    assert!(matches!(suite.success(), Err(StagehandError::Precondition(_))));
    assert!(matches!(suite.failed(), Err(StagehandError::Precondition(_))));
    assert!(matches!(suite.test_count(), Err(StagehandError::Precondition(_))));
    assert!(matches!(suite.results(), Err(StagehandError::Precondition(_))));
    assert!(matches!(suite.summarize(), Err(StagehandError::Precondition(_))));
    assert!(matches!(suite.write_junit_xml(), Err(StagehandError::Precondition(_))));

    let err = suite.success().unwrap_err();
    assert_eq!(err.to_string(), "tests have not been run yet");
}

#[test]
fn test_second_run_is_rejected() {
    let ws = Workspace::new(&["01_pass"]);
    let (mut suite, executor) = ws.suite(ws.options(), false);

    suite.run().unwrap();
    assert!(matches!(suite.run(), Err(StagehandError::Precondition(_))));
    assert_eq!(executor.calls.borrow().len(), 1);
    assert!(suite.has_run());
}

#[test]
fn test_no_test_files_is_configuration_error() {
    let ws = Workspace::new(&[]);
    let result = Suite::new("empty", vec![], ws.options(), HostConfig::default(), false);
    assert!(matches!(result, Err(StagehandError::Configuration(_))));
}

#[test]
fn test_name_is_normalized() {
    let ws = Workspace::new(&["01_pass"]);
    let (suite, _) = ws.suite(ws.options(), false);
    assert_eq!(suite.name(), "nightly-acceptance");
}

#[test]
fn test_seeded_order_is_reproducible() {
    let files: Vec<String> = (0..20).map(|i| format!("{i:02}_pass")).collect();
    let names: Vec<&str> = files.iter().map(String::as_str).collect();
    let ws = Workspace::new(&names);

    let seeded = Options {
        random: RandomSetting::Seed(1234),
        ..ws.options()
    };
    let (first, _) = ws.suite(seeded.clone(), false);
    let (second, _) = ws.suite(seeded, false);
    let (sorted, _) = ws.suite(ws.options(), false);

    assert_eq!(first.random_seed(), Some(1234));
    assert_eq!(first.test_files(), second.test_files());
    assert_ne!(first.test_files(), sorted.test_files());
    assert_eq!(sorted.random_seed(), None);

    let (mut run, executor) = ws.suite(
        Options {
            random: RandomSetting::Seed(1234),
            ..ws.options()
        },
        false,
    );
    run.run().unwrap();
    assert_eq!(executor.calls.borrow().as_slice(), first.test_files());

    let run_log = fs::read_to_string(run.log_dir().unwrap().join("nightly-acceptance-run.log")).unwrap();
    assert!(run_log.contains("Using random seed 1234"));
}

#[test]
fn test_log_files_are_written() {
    let ws = Workspace::new(&["01_pass", "02_fail"]);
    let (mut suite, _) = ws.suite(ws.options(), false);

    suite.run().unwrap();

    let run_dir = suite.log_dir().unwrap().to_path_buf();
    let run_log = fs::read_to_string(run_dir.join("nightly-acceptance-run.log")).unwrap();
    assert!(run_log.contains("Begin "));
    assert!(!run_log.contains("Using random seed"));
    assert!(run_log.contains("01_pass passed in "));
    assert!(run_log.contains("02_fail failed in "));

    let summary = fs::read_to_string(run_dir.join("nightly-acceptance-summary.txt")).unwrap();
    assert!(summary.contains("Test Suite: nightly-acceptance @ "));
    assert!(summary.contains("          Attempted: 2"));
    assert!(summary.contains("reported: #<Failure: boom>"));
    assert!(!summary.contains("Begin "));
}

#[test]
fn test_stdout_only_writes_no_log_directory() {
    let ws = Workspace::new(&["01_pass"]);
    let options = Options {
        stdout_only: true,
        ..ws.options()
    };
    let (mut suite, _) = ws.suite(options, false);

    suite.run().unwrap();
    assert!(!ws.dir.path().join("log").exists());
}

#[test]
fn test_junit_report_written_when_requested() {
    let ws = Workspace::new(&["01_pass", "02_fail", "03_skip"]);
    let options = Options {
        xml: true,
        ..ws.options()
    };
    let (mut suite, _) = ws.suite(options, false);

    suite.run().unwrap();

    let xml = fs::read_to_string(ws.dir.path().join("junit/nightly-acceptance.xml")).unwrap();
    assert!(xml.contains("tests=\"3\""));
    assert!(xml.contains("failures=\"1\""));
    assert!(xml.contains("errors=\"0\""));
    assert!(xml.contains("skip=\"1\""));
    assert!(xml.contains("pending=\"0\""));
    assert_eq!(xml.matches("<failure ").count(), 1);
    assert!(xml.contains("<failure type=\"fail\" message=\"boom\""));
}

#[test]
fn test_junit_failure_does_not_change_outcome() {
    let ws = Workspace::new(&["01_pass", "02_skip"]);
    let blocker = ws.dir.path().join("not-a-dir");
    fs::write(&blocker, "occupied").unwrap();

    let options = Options {
        xml: true,
        junit_dir: blocker,
        ..ws.options()
    };
    let (mut suite, _) = ws.suite(options, false);

    assert!(suite.run().is_ok());
    assert!(suite.success().unwrap());
    assert!(suite.write_junit_xml().is_err());
}

#[test]
fn test_run_and_check() {
    let ws = Workspace::new(&["01_pass"]);
    let (mut suite, _) = ws.suite(ws.options(), false);
    assert!(suite.run_and_check().is_ok());

    let ws = Workspace::new(&["01_pass", "02_error"]);
    let (mut suite, _) = ws.suite(ws.options(), false);
    match suite.run_and_check() {
        Err(StagehandError::SuiteFailed { name }) => assert_eq!(name, "nightly-acceptance"),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected SuiteFailed"),
    }
    assert_eq!(suite.test_count().unwrap(), 2);
}
