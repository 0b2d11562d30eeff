//! Build mode resolution.
//!
//! Every mode-dependent choice in this crate takes a [`BuildMode`] by value
//! instead of reading the environment.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Resolved execution environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Unminified output, per-build hashes, dev server and live reload
    #[default]
    Development,
    /// Content-hashed, extracted and minified output
    Production,
}

impl BuildMode {
    /// Resolve an externally supplied mode flag.
    ///
    /// Only the exact string `production` selects production. Anything else,
    /// including an absent flag, is development.
    ///
    /// # Example
    ///
    /// ```
    /// use kiva_config::BuildMode;
    ///
    /// assert_eq!(BuildMode::resolve(Some("production")), BuildMode::Production);
    /// assert_eq!(BuildMode::resolve(Some("staging")), BuildMode::Development);
    /// assert_eq!(BuildMode::resolve(None), BuildMode::Development);
    /// ```
    pub fn resolve(flag: Option<&str>) -> Self {
        match flag {
            Some("production") => BuildMode::Production,
            _ => BuildMode::Development,
        }
    }

    pub const fn is_production(self) -> bool {
        matches!(self, BuildMode::Production)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }

    /// Source map style handed to the bundler (`None` disables source maps).
    pub const fn devtool(self) -> Option<&'static str> {
        match self {
            BuildMode::Development => Some("cheap-module-source-map"),
            BuildMode::Production => None,
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BuildMode::resolve(Some(s)))
    }
}
