//! Project configuration.
//!
//! Sources are layered with figment, later ones winning:
//! defaults < `kiva.toml` / `kiva.config.json` < `KIVA_*` environment.
//! CLI flags are merged on top by the caller through [`KivaConfig::figment`].
//!
//! Defaults come from the serde attributes rather than a figment layer, so a
//! source that declares `aliases` or `devServer.proxy` replaces the default
//! table instead of merging into it.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Toml},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::compose::PerformanceBudget;
use crate::dev::DevServerOptions;
use crate::error::{ConfigError, Result};

pub const CONFIG_FILES: [&str; 2] = ["kiva.toml", "kiva.config.json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KivaConfig {
    /// Application entry module, relative to the project root
    #[serde(default = "default_entry")]
    pub entry: String,

    /// Client that reconnects the page to the dev server
    #[serde(default = "default_hot_client")]
    pub hot_client: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// HTML shell template
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Import alias → directory, relative to the project root
    #[serde(default = "default_aliases")]
    pub aliases: IndexMap<String, PathBuf>,

    #[serde(default)]
    pub dev_server: DevServerOptions,

    #[serde(default)]
    pub performance: PerformanceBudget,
}

impl Default for KivaConfig {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            hot_client: default_hot_client(),
            output_dir: default_output_dir(),
            public_dir: default_public_dir(),
            template: default_template(),
            aliases: default_aliases(),
            dev_server: DevServerOptions::default(),
            performance: PerformanceBudget::default(),
        }
    }
}

impl KivaConfig {
    /// Locate a config file in `root`.
    pub fn discover(root: &Path) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
    }

    /// Layered sources without extracting, so callers can merge more on top.
    pub fn figment(root: &Path, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new();

        let file = match explicit {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::InvalidValue {
                    field: "config".to_string(),
                    message: format!("config file not found: {}", path.display()),
                });
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(root),
        };

        if let Some(path) = file {
            tracing::debug!("Loading config from {}", path.display());
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(&path)),
                _ => figment.merge(Json::file(&path)),
            };
        }

        // KIVA_DEV_SERVER__PORT=9000 → devServer.port
        Ok(figment.merge(
            Env::prefixed("KIVA_")
                .lowercase(false)
                .split("__")
                .map(|key| camel_case_path(key.as_str()).into()),
        ))
    }

    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(root, explicit)?.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.entry.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "entry".to_string(),
                message: "entry cannot be empty".to_string(),
            });
        }
        if self.dev_server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "devServer.port".to_string(),
                message: "port must be between 1 and 65535".to_string(),
            });
        }
        if !self.dev_server.mock.prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "devServer.mock.prefix".to_string(),
                message: "mock prefix must start with '/'".to_string(),
            });
        }
        self.dev_server.proxy_routes()?;
        Ok(())
    }

    /// Alias targets resolved against `root`, in declaration order.
    pub fn resolved_aliases(&self, root: &Path) -> IndexMap<String, PathBuf> {
        self.aliases
            .iter()
            .map(|(alias, dir)| (alias.clone(), root.join(dir)))
            .collect()
    }
}

/// `dev_server.port` → `devServer.port`
fn camel_case_path(key: &str) -> String {
    key.split('.')
        .map(|segment| {
            let mut out = String::with_capacity(segment.len());
            let mut upper = false;
            for ch in segment.chars() {
                if ch == '_' {
                    upper = true;
                } else if upper {
                    out.push(ch.to_ascii_uppercase());
                    upper = false;
                } else {
                    out.push(ch.to_ascii_lowercase());
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn default_entry() -> String {
    "./src/index.tsx".into()
}

fn default_hot_client() -> String {
    "react-dev-utils/webpackHotDevClient".into()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_template() -> PathBuf {
    PathBuf::from("src/config/index.html")
}

fn default_aliases() -> IndexMap<String, PathBuf> {
    IndexMap::from([
        ("@".to_string(), PathBuf::from("src")),
        ("@@".to_string(), PathBuf::from("src/pages")),
        ("config".to_string(), PathBuf::from("src/config")),
        ("kiva".to_string(), PathBuf::from("kiva")),
    ])
}
