//! Error types for configuration loading and composition.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Composition errors
    #[error("HTML shell template is unreadable: {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    // Config parsing/loading errors
    #[error("invalid config value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}
