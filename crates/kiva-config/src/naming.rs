//! Output file naming.
//!
//! Production names carry a hash of the emitted content, so an unchanged
//! artifact keeps its name across builds. Development names carry the
//! compilation hash, which changes on every run.

use serde::Serialize;
use uuid::Uuid;

use crate::mode::BuildMode;

/// Number of hex characters kept from a hash.
pub const HASH_LENGTH: usize = 8;

/// Output subdirectory an artifact lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Script,
    Style,
    Image,
    Font,
}

impl AssetCategory {
    pub const fn directory(self) -> &'static str {
        match self {
            AssetCategory::Script => "js",
            AssetCategory::Style => "css",
            AssetCategory::Image => "images",
            AssetCategory::Font => "font",
        }
    }

    /// Fixed extension, or `None` when the source extension is kept.
    const fn extension(self) -> Option<&'static str> {
        match self {
            AssetCategory::Script => Some("js"),
            AssetCategory::Style => Some("css"),
            AssetCategory::Image | AssetCategory::Font => None,
        }
    }
}

/// Which hash a filename token carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashKind {
    /// Hash of the chunk's content
    ChunkHash,
    /// Hash of the emitted file's content
    ContentHash,
    /// Hash of the whole compilation, new on every run
    FullHash,
}

impl HashKind {
    pub const fn token(self) -> &'static str {
        match self {
            HashKind::ChunkHash => "chunkhash",
            HashKind::ContentHash => "contenthash",
            HashKind::FullHash => "fullhash",
        }
    }

    pub const fn is_content_derived(self) -> bool {
        !matches!(self, HashKind::FullHash)
    }
}

/// One bundler compilation.
///
/// Owns the identity that feeds `[fullhash]` tokens.
#[derive(Debug, Clone)]
pub struct Compilation {
    id: Uuid,
}

impl Compilation {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    pub fn with_id(id: Uuid) -> Self {
        Self { id }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Full hex hash identifying this compilation.
    pub fn hash(&self) -> String {
        blake3::hash(self.id.as_bytes()).to_hex().to_string()
    }
}

impl Default for Compilation {
    fn default() -> Self {
        Self::new()
    }
}

/// Full hex hash of some emitted content.
pub fn content_hash(content: &[u8]) -> String {
    blake3::hash(content).to_hex().to_string()
}

/// Filename template for one asset category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputNamingScheme {
    pub category: AssetCategory,
    pub hash: HashKind,
    pub length: usize,
}

impl OutputNamingScheme {
    pub fn for_category(mode: BuildMode, category: AssetCategory) -> Self {
        let hash = match (mode, category) {
            (BuildMode::Development, _) => HashKind::FullHash,
            (BuildMode::Production, AssetCategory::Script) => HashKind::ChunkHash,
            (BuildMode::Production, _) => HashKind::ContentHash,
        };

        Self {
            category,
            hash,
            length: HASH_LENGTH,
        }
    }

    /// Template string in the bundler's placeholder syntax,
    /// e.g. `js/[name].[chunkhash:8].js`.
    pub fn template(&self) -> String {
        format!(
            "{}/[name].[{}:{}].{}",
            self.category.directory(),
            self.hash.token(),
            self.length,
            self.category.extension().unwrap_or("[ext]")
        )
    }

    /// Concrete relative path for an artifact.
    ///
    /// `extension` is only consulted for categories that keep the source
    /// extension (images and fonts).
    pub fn render(
        &self,
        name: &str,
        extension: &str,
        content: &[u8],
        compilation: &Compilation,
    ) -> String {
        let full = if self.hash.is_content_derived() {
            content_hash(content)
        } else {
            compilation.hash()
        };
        let token = &full[..self.length.min(full.len())];
        let ext = self.category.extension().unwrap_or(extension);

        format!("{}/{}.{}.{}", self.category.directory(), name, token, ext)
    }
}
