pub mod config;
pub mod error;
pub mod logger;
pub mod output;
pub mod runner;

// Re-export commonly used types
pub use error::{Result, StagehandError};
pub use runner::{Suite, TestCaseExecutor, TestCaseResult, TestStatus};
