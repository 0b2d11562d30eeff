//! Regular-expression wrapper that serializes back to its source text.

use std::fmt;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{ConfigError, Result};

/// A compiled pattern as it appears in `test`, `issuer` and `exclude` fields.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        Regex::new(source)
            .map(Pattern)
            .map_err(|source_err| ConfigError::Pattern {
                pattern: source.to_string(),
                source: Box::new(source_err),
            })
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Replace the first match, like `String.prototype.replace` with a non-global regex.
    pub fn replace_first(&self, haystack: &str, replacement: &str) -> String {
        self.0
            .replacen(haystack, 1, regex::NoExpand(replacement))
            .into_owned()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.0.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_first_only_touches_first_match() {
        let pattern = Pattern::new("^/proxy").unwrap();
        assert_eq!(pattern.replace_first("/proxy/proxy", ""), "/proxy");
        assert_eq!(pattern.replace_first("/api/proxy", ""), "/api/proxy");
    }

    #[test]
    fn invalid_pattern_reports_source() {
        let err = Pattern::new("(unclosed").unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn serializes_as_source_text() {
        let pattern = Pattern::new(r"\.css$").unwrap();
        assert_eq!(serde_json::to_string(&pattern).unwrap(), r#""\\.css$""#);
    }
}
