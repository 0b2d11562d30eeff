//! Development server configuration types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::pattern::Pattern;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerOptions {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub compress: bool,

    /// Directory served for requests no route claims
    #[serde(default = "default_content_base")]
    pub content_base: PathBuf,

    #[serde(default = "default_index")]
    pub index: String,

    /// Serve `index` for unknown paths so client-side routing works
    #[serde(default = "default_true")]
    pub history_api_fallback: bool,

    #[serde(default = "default_true")]
    pub overlay: bool,

    #[serde(default)]
    pub open: bool,

    #[serde(default)]
    pub hot: bool,

    /// Console output of the dev server's compiler
    #[serde(default)]
    pub stats: StatsPreset,

    #[serde(default)]
    pub mock: MockOptions,

    /// Context prefix → proxy rule, tried in insertion order
    #[serde(default = "default_proxy")]
    pub proxy: IndexMap<String, ProxyRule>,
}

impl Default for DevServerOptions {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            compress: true,
            content_base: default_content_base(),
            index: default_index(),
            history_api_fallback: true,
            overlay: true,
            open: false,
            hot: false,
            stats: StatsPreset::default(),
            mock: MockOptions::default(),
            proxy: default_proxy(),
        }
    }
}

impl DevServerOptions {
    /// Compile every proxy rule.
    pub fn proxy_routes(&self) -> Result<Vec<ProxyRoute>> {
        self.proxy
            .iter()
            .map(|(context, rule)| ProxyRoute::compile(context, rule))
            .collect()
    }
}

/// Which sections the compiler prints on each rebuild. Everything but
/// color is off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsPreset {
    pub assets: bool,
    pub children: bool,
    pub chunks: bool,
    pub chunk_modules: bool,
    pub colors: bool,
    pub entrypoints: bool,
    pub hash: bool,
    pub modules: bool,
    pub timings: bool,
    pub version: bool,
}

impl Default for StatsPreset {
    fn default() -> Self {
        Self {
            assets: false,
            children: false,
            chunks: false,
            chunk_modules: false,
            colors: true,
            entrypoints: false,
            hash: false,
            modules: false,
            timings: false,
            version: false,
        }
    }
}

/// Where fixtures come from and which requests they answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockOptions {
    #[serde(default = "default_mock_prefix")]
    pub prefix: String,

    /// Fixture file, relative to the project root
    #[serde(default = "default_fixtures")]
    pub fixtures: PathBuf,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            prefix: default_mock_prefix(),
            fixtures: default_fixtures(),
        }
    }
}

impl MockOptions {
    /// Fixture key for `path`, or `None` when the path is not a mock request.
    ///
    /// ```
    /// use kiva_config::MockOptions;
    ///
    /// let mock = MockOptions::default();
    /// assert_eq!(mock.suffix("/mock/users"), Some("/users"));
    /// assert_eq!(mock.suffix("/api/users"), None);
    /// ```
    pub fn suffix<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_prefix(self.prefix.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRule {
    pub target: String,

    /// Anchored pattern → replacement, applied in order
    #[serde(default)]
    pub path_rewrite: IndexMap<String, String>,

    /// Rewrite `Host` and `Origin` to the target
    #[serde(default)]
    pub change_origin: bool,
}

/// A proxy rule ready to route requests.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    pub context: String,
    pub target: String,
    pub change_origin: bool,
    rewrites: Vec<(Pattern, String)>,
}

impl ProxyRoute {
    pub fn compile(context: &str, rule: &ProxyRule) -> Result<Self> {
        if !context.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: format!("devServer.proxy.{context}"),
                message: "proxy context must start with '/'".to_string(),
            });
        }
        if !(rule.target.starts_with("http://") || rule.target.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: format!("devServer.proxy.{context}.target"),
                message: format!("'{}' is not an http(s) origin", rule.target),
            });
        }

        let rewrites = rule
            .path_rewrite
            .iter()
            .map(|(pattern, replacement)| Ok((Pattern::new(pattern)?, replacement.clone())))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            context: context.to_string(),
            target: rule.target.trim_end_matches('/').to_string(),
            change_origin: rule.change_origin,
            rewrites,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.context)
    }

    /// Apply the path rewrites. The result always starts with `/`.
    pub fn rewrite_path(&self, path: &str) -> String {
        let rewritten = self
            .rewrites
            .iter()
            .fold(path.to_string(), |acc, (pattern, replacement)| {
                pattern.replace_first(&acc, replacement)
            });

        if rewritten.starts_with('/') {
            rewritten
        } else {
            format!("/{rewritten}")
        }
    }

    /// Absolute upstream URL for a request path and optional query.
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> String {
        let mut url = format!("{}{}", self.target, self.rewrite_path(path));
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// `host[:port]` of the target, used when rewriting `Host`.
    pub fn target_authority(&self) -> &str {
        let rest = self
            .target
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.target);
        rest.split('/').next().unwrap_or(rest)
    }
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "localhost".into()
}

fn default_port() -> u16 {
    8080
}

fn default_content_base() -> PathBuf {
    PathBuf::from("build")
}

fn default_index() -> String {
    "index.html".into()
}

fn default_mock_prefix() -> String {
    "/mock".into()
}

fn default_fixtures() -> PathBuf {
    PathBuf::from("mocks.json")
}

fn default_proxy() -> IndexMap<String, ProxyRule> {
    let mut proxy = IndexMap::new();
    proxy.insert(
        "/proxy".to_string(),
        ProxyRule {
            target: "http://127.0.0.1".to_string(),
            path_rewrite: IndexMap::from([("^/proxy".to_string(), String::new())]),
            change_origin: true,
        },
    );
    proxy
}
