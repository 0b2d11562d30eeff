//! Build graph composition.
//!
//! [`compose`] assembles the single configuration document handed to the
//! bundler. It runs once per invocation and the result is never mutated.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::assets::{AssetRule, asset_rules};
use crate::config::KivaConfig;
use crate::dev::DevServerOptions;
use crate::error::{ConfigError, Result};
use crate::mode::BuildMode;
use crate::naming::{AssetCategory, OutputNamingScheme};
use crate::plugins::{EnvSnapshot, HtmlShell, Plugin, PluginContext, select_plugins};
use crate::split::SplittingPolicy;

/// 3 MiB
pub const DEFAULT_BUDGET: u64 = 3 * 1024 * 1024;

pub const RESOLVE_EXTENSIONS: [&str; 4] = [".js", ".ts", ".jsx", ".tsx"];

/// Soft size limits. Exceeding them produces warnings, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceBudget {
    #[serde(default = "default_budget")]
    pub max_asset_size: u64,
    #[serde(default = "default_budget")]
    pub max_entrypoint_size: u64,
}

impl Default for PerformanceBudget {
    fn default() -> Self {
        Self {
            max_asset_size: DEFAULT_BUDGET,
            max_entrypoint_size: DEFAULT_BUDGET,
        }
    }
}

fn default_budget() -> u64 {
    DEFAULT_BUDGET
}

/// A named artifact or entrypoint with its size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedItem {
    pub name: String,
    pub size: u64,
}

impl SizedItem {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    Asset,
    Entrypoint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetWarning {
    pub kind: BudgetKind,
    pub name: String,
    pub size: u64,
    pub limit: u64,
}

impl fmt::Display for BudgetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BudgetKind::Asset => "asset",
            BudgetKind::Entrypoint => "entrypoint",
        };
        write!(
            f,
            "{} '{}' is {} bytes, over the {} byte budget",
            kind, self.name, self.size, self.limit
        )
    }
}

impl PerformanceBudget {
    pub fn check(&self, assets: &[SizedItem], entrypoints: &[SizedItem]) -> Vec<BudgetWarning> {
        let over = |items: &[SizedItem], kind: BudgetKind, limit: u64| {
            items
                .iter()
                .filter(move |item| item.size > limit)
                .map(move |item| BudgetWarning {
                    kind,
                    name: item.name.clone(),
                    size: item.size,
                    limit,
                })
                .collect::<Vec<_>>()
        };

        let mut warnings = over(assets, BudgetKind::Asset, self.max_asset_size);
        warnings.extend(over(entrypoints, BudgetKind::Entrypoint, self.max_entrypoint_size));
        warnings
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolve {
    pub extensions: Vec<String>,
    pub alias: IndexMap<String, PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub filename: String,
    pub path: PathBuf,
    pub public_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleRules {
    pub rules: Vec<AssetRule>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimization {
    pub split_chunks: SplittingPolicy,
    pub minimizer: Vec<String>,
}

/// The assembled configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub mode: BuildMode,
    pub stats: String,
    #[serde(serialize_with = "devtool_or_false")]
    pub devtool: Option<String>,
    pub context: PathBuf,
    pub resolve: Resolve,
    pub dev_server: DevServerOptions,
    pub optimization: Optimization,
    pub performance: PerformanceBudget,
    pub entry: Vec<String>,
    pub output: Output,
    pub module: ModuleRules,
    pub plugins: Vec<Plugin>,
}

impl BuildConfig {
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            message: e.to_string(),
        })
    }

    pub fn html_shell(&self) -> Option<&HtmlShell> {
        self.plugins.iter().find_map(|plugin| match plugin {
            Plugin::Html(shell) => Some(shell),
            _ => None,
        })
    }
}

fn devtool_or_false<S: Serializer>(
    devtool: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match devtool {
        Some(devtool) => serializer.serialize_str(devtool),
        None => serializer.serialize_bool(false),
    }
}

/// Compose using the current process environment for exposed variables.
pub fn compose(mode: BuildMode, root: &Path, config: &KivaConfig) -> Result<BuildConfig> {
    compose_with_env(mode, root, config, EnvSnapshot::capture())
}

pub fn compose_with_env(
    mode: BuildMode,
    root: &Path,
    config: &KivaConfig,
    env: EnvSnapshot,
) -> Result<BuildConfig> {
    tracing::debug!(%mode, root = %root.display(), "composing build configuration");

    let html = HtmlShell::load(root.join(&config.template), mode)?;
    let output_dir = root.join(&config.output_dir);

    let plugins = select_plugins(
        mode,
        &PluginContext {
            public_dir: root.join(&config.public_dir),
            output_dir: output_dir.clone(),
            html,
            port: config.dev_server.port,
            env,
        },
    );

    let entry = match mode {
        BuildMode::Production => vec![config.entry.clone()],
        BuildMode::Development => vec![config.hot_client.clone(), config.entry.clone()],
    };

    Ok(BuildConfig {
        mode,
        stats: "errors-only".to_string(),
        devtool: mode.devtool().map(str::to_string),
        context: root.to_path_buf(),
        resolve: Resolve {
            extensions: RESOLVE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            alias: config.resolved_aliases(root),
        },
        dev_server: config.dev_server.clone(),
        optimization: Optimization {
            split_chunks: SplittingPolicy::standard()?,
            minimizer: vec!["terser".to_string(), "css-minimizer".to_string()],
        },
        performance: config.performance,
        entry,
        output: Output {
            filename: OutputNamingScheme::for_category(mode, AssetCategory::Script).template(),
            path: output_dir,
            public_path: "/".to_string(),
        },
        module: ModuleRules {
            rules: asset_rules(mode)?,
        },
        plugins,
    })
}
