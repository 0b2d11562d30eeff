//! Error handling for the kiva CLI.
//!
//! Commands return [`CliError`]; `main` converts it into a miette report.
//! Domain errors from `kiva-config` and the gateway convert automatically
//! via `#[from]`.

use std::path::PathBuf;
use thiserror::Error;

mod miette;

pub use self::miette::cli_error_to_miette;

use crate::gateway::FixtureError;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading, validation, or composition failed
    #[error("Configuration error: {0}")]
    Config(#[from] kiva_config::ConfigError),

    /// Fixture file could not be used
    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Gateway start-up or runtime errors
    #[error("Server error: {0}")]
    Server(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        CliError::Config(err.into())
    }
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiva_cli::{CliError, ResultExt};
    ///
    /// let read = std::fs::read_to_string("/definitely/missing/mocks.json");
    /// let err = read.with_path("mocks.json").unwrap_err();
    /// assert!(matches!(err, CliError::FileNotFound(_)));
    /// ```
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    ///
    /// # Arguments
    ///
    /// * `hint` - Suggested fix, shown after a `Hint:` label
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
