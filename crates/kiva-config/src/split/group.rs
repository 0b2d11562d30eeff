use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::pattern::Pattern;

/// Which chunks a group may pull modules out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkScope {
    #[default]
    All,
    Async,
    Initial,
}

/// A module as seen by the splitting policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleInfo<'a> {
    /// Absolute resource path of the module
    pub resource: &'a str,
    /// Module size in bytes
    pub size: u64,
    /// Number of chunks that reference the module
    pub chunks: usize,
}

impl<'a> ModuleInfo<'a> {
    pub fn new(resource: &'a str) -> Self {
        Self {
            resource,
            size: 0,
            chunks: 1,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_chunks(mut self, chunks: usize) -> Self {
        self.chunks = chunks;
        self
    }
}

/// Predicate used by [`ModuleTest::Custom`]. An `Err` counts as no match.
pub type ModulePredicate = dyn Fn(&ModuleInfo<'_>) -> Result<bool, String> + Send + Sync;

/// Membership test of a cache group.
#[derive(Clone, Default)]
pub enum ModuleTest {
    /// Every module is a candidate
    #[default]
    Any,
    /// Resource path must match
    Pattern(Pattern),
    /// Caller-supplied predicate
    Custom(Arc<ModulePredicate>),
}

impl ModuleTest {
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&ModuleInfo<'_>) -> Result<bool, String> + Send + Sync + 'static,
    {
        ModuleTest::Custom(Arc::new(predicate))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, ModuleTest::Any)
    }

    pub(crate) fn evaluate(&self, module: &ModuleInfo<'_>) -> Result<bool, String> {
        match self {
            ModuleTest::Any => Ok(true),
            ModuleTest::Pattern(pattern) => Ok(pattern.is_match(module.resource)),
            ModuleTest::Custom(predicate) => predicate(module),
        }
    }
}

impl fmt::Debug for ModuleTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleTest::Any => f.write_str("Any"),
            ModuleTest::Pattern(pattern) => write!(f, "Pattern({:?})", pattern),
            ModuleTest::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Serialize for ModuleTest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ModuleTest::Any => serializer.serialize_none(),
            ModuleTest::Pattern(pattern) => pattern.serialize(serializer),
            ModuleTest::Custom(_) => serializer.serialize_str("[function]"),
        }
    }
}

/// A named candidate destination for modules.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheGroup {
    pub name: String,

    #[serde(skip_serializing_if = "ModuleTest::is_any")]
    pub test: ModuleTest,

    pub chunks: ChunkScope,

    /// Compared as a signed integer; higher wins
    pub priority: i32,

    /// Falls back to the policy's `minChunks` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_chunks: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,

    /// Bypass size-bound filtering entirely
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enforce: bool,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub reuse_existing_chunk: bool,
}

impl CacheGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test: ModuleTest::Any,
            chunks: ChunkScope::All,
            priority: 0,
            min_chunks: None,
            min_size: None,
            max_size: None,
            enforce: false,
            reuse_existing_chunk: false,
        }
    }

    pub fn test(mut self, test: ModuleTest) -> Self {
        self.test = test;
        self
    }

    pub fn pattern(self, pattern: Pattern) -> Self {
        self.test(ModuleTest::Pattern(pattern))
    }

    pub fn chunks(mut self, chunks: ChunkScope) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn min_chunks(mut self, min_chunks: usize) -> Self {
        self.min_chunks = Some(min_chunks);
        self
    }

    pub fn size_bounds(mut self, min_size: Option<u64>, max_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn enforce(mut self) -> Self {
        self.enforce = true;
        self
    }

    pub fn reuse_existing_chunk(mut self) -> Self {
        self.reuse_existing_chunk = true;
        self
    }
}
