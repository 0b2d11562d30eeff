//! Fixture file loading.

use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Why a fixture file could not be used.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// No file at the path. The gateway runs without mock routes.
    #[error("fixture file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("fixture file {} is not valid JSON: {source}\n\nHint: fixtures must be an object mapping URL suffixes to response templates", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read fixture file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// URL suffix → response template, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureSet {
    routes: IndexMap<String, Value>,
}

impl FixtureSet {
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => FixtureError::NotFound(path.to_path_buf()),
            _ => FixtureError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Self::parse(&raw).map_err(|source| FixtureError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let routes: IndexMap<String, Value> = serde_json::from_str(raw)?;
        Ok(Self { routes })
    }

    /// Like [`FixtureSet::load`], but a missing file yields `None`.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, FixtureError> {
        match Self::load(path) {
            Ok(set) => Ok(Some(set)),
            Err(FixtureError::NotFound(path)) => {
                tracing::debug!("No fixture file at {}, mock route disabled", path.display());
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn get(&self, suffix: &str) -> Option<&Value> {
        self.routes.get(suffix)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn suffixes(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for FixtureSet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_distinguished() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mocks.json");

        assert!(matches!(FixtureSet::load(&path), Err(FixtureError::NotFound(_))));
        assert!(FixtureSet::load_optional(&path).unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mocks.json");
        fs::write(&path, "{ \"/users\": ").unwrap();

        let err = FixtureSet::load_optional(&path).unwrap_err();
        assert!(matches!(err, FixtureError::Parse { .. }));
        assert!(err.to_string().contains("mocks.json"));
    }

    #[test]
    fn non_object_root_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mocks.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(FixtureSet::load(&path), Err(FixtureError::Parse { .. })));
    }

    #[test]
    fn keys_keep_file_order() {
        let set = FixtureSet::parse(r#"{ "/b": 1, "/a": { "id|1-100": 1 } }"#).unwrap();
        assert_eq!(set.suffixes().collect::<Vec<_>>(), ["/b", "/a"]);
        assert_eq!(set.get("/b"), Some(&Value::from(1)));
        assert!(set.get("/c").is_none());
    }
}
