pub mod discovery;
pub mod executor;
pub mod junit;
pub mod reporter;
pub mod suite;
pub mod types;

pub use executor::{CommandExecutor, TestCaseExecutor};
pub use junit::JunitReport;
pub use reporter::SummaryReporter;
pub use suite::Suite;
pub use types::{SuiteStats, TestCaseResult, TestException, TestStatus};
