use thiserror::Error;

#[derive(Error, Debug)]
pub enum StagehandError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Precondition(String),

    #[error("failed while running the {name} suite")]
    SuiteFailed { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

impl StagehandError {
    /// The error every result accessor returns before `run` has been called.
    pub fn not_run() -> Self {
        StagehandError::Precondition("tests have not been run yet".to_string())
    }
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for StagehandError {
    fn from(err: anyhow::Error) -> Self {
        StagehandError::Other(err.to_string())
    }
}

/// Result type for stagehand crate
pub type Result<T> = std::result::Result<T, StagehandError>;
