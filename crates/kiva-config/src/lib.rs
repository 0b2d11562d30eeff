//! Build configuration policy for kiva single-page applications.
//!
//! Everything here is a pure function of a [`BuildMode`] and the project
//! configuration. [`compose`] assembles the document handed to the bundler;
//! the dev server types describe the gateway `kiva dev` runs.

pub mod assets;
pub mod compose;
pub mod config;
pub mod dev;
pub mod error;
pub mod mode;
pub mod naming;
pub mod pattern;
pub mod plugins;
pub mod split;

// Re-export main types
pub use assets::{
    AssetClass, AssetEmission, AssetRule, INLINE_LIMIT, LoaderUse, StyleArtifact, asset_rules,
    emit_font, emit_image, emit_stylesheet, matching_rules, rule_for, style_chain,
};
pub use compose::{
    BudgetKind, BudgetWarning, BuildConfig, PerformanceBudget, SizedItem, compose,
    compose_with_env,
};
pub use config::KivaConfig;
pub use dev::{DevServerOptions, MockOptions, ProxyRoute, ProxyRule, StatsPreset};
pub use error::{ConfigError, Result};
pub use mode::BuildMode;
pub use naming::{AssetCategory, Compilation, HashKind, OutputNamingScheme};
pub use pattern::Pattern;
pub use plugins::{EnvSnapshot, HtmlShell, Plugin, PluginContext, select_plugins};
pub use split::{
    CacheGroup, ChunkDecision, ChunkScope, ModuleInfo, ModuleTest, SizeBounds, SplittingPolicy,
};
