pub mod hosts;
pub mod options;

pub use hosts::{Host, HostConfig, HostSpec};
pub use options::{Options, OptionsLoader, RandomSetting};
