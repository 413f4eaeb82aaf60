pub mod log_dir;
pub mod sink;

pub use log_dir::LogDir;
pub use sink::{Level, LogSink};
