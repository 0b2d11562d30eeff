//! Build plugin selection.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::mode::BuildMode;
use crate::naming::{AssetCategory, OutputNamingScheme};

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));
static INTER_TAG_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("whitespace pattern is valid"));
static RUNS_OF_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"));

/// Environment variables the running application may see. Nothing else is
/// ever copied into client code.
pub const EXPOSED_ENV: [&str; 4] = [
    "TERM",
    "WDS_SOCKET_HOST",
    "WDS_SOCKET_PORT",
    "WDS_SOCKET_PATH",
];

/// Values of the allow-listed variables at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    pub platform: String,
    values: IndexMap<&'static str, Option<String>>,
}

impl EnvSnapshot {
    /// Read the allow-list from the process environment.
    pub fn capture() -> Self {
        Self::from_lookup(node_platform(), |key| std::env::var(key).ok())
    }

    /// Read the allow-list through `lookup`; other keys are never requested.
    pub fn from_lookup(platform: impl Into<String>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            platform: platform.into(),
            values: EXPOSED_ENV.iter().map(|key| (*key, lookup(key))).collect(),
        }
    }

    /// Compile-time replacements: identifier → JavaScript literal.
    pub fn definitions(&self) -> IndexMap<String, String> {
        let mut defs = IndexMap::new();
        defs.insert("process.platform".to_string(), js_literal(Some(&self.platform)));
        for (key, value) in &self.values {
            defs.insert(format!("process.env.{key}"), js_literal(value.as_deref()));
        }
        defs
    }
}

fn js_literal(value: Option<&str>) -> String {
    match value {
        Some(value) => serde_json::Value::from(value).to_string(),
        None => "undefined".to_string(),
    }
}

/// Platform identifier in the spelling the browser code expects.
fn node_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// Minification switches for the HTML shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlMinify {
    pub remove_comments: bool,
    pub collapse_whitespace: bool,
    #[serde(rename = "minifyCSS")]
    pub minify_css: bool,
}

impl HtmlMinify {
    pub fn for_mode(mode: BuildMode) -> Option<Self> {
        mode.is_production().then_some(Self {
            remove_comments: true,
            collapse_whitespace: true,
            minify_css: true,
        })
    }
}

/// The page template bundles are injected into.
#[derive(Debug, Clone, Serialize)]
pub struct HtmlShell {
    pub filename: String,
    pub template: PathBuf,
    pub inject: bool,
    pub hash: bool,
    #[serde(serialize_with = "minify_or_false")]
    pub minify: Option<HtmlMinify>,
    #[serde(skip)]
    source: String,
}

impl HtmlShell {
    /// Read the template. An unreadable template is fatal for composition.
    pub fn load(template: impl AsRef<Path>, mode: BuildMode) -> Result<Self> {
        let template = template.as_ref();
        let source = std::fs::read_to_string(template).map_err(|source| ConfigError::Template {
            path: template.to_path_buf(),
            source,
        })?;

        Ok(Self::from_source(template, source, mode))
    }

    pub fn from_source(template: impl Into<PathBuf>, source: impl Into<String>, mode: BuildMode) -> Self {
        Self {
            filename: "index.html".to_string(),
            template: template.into(),
            inject: true,
            hash: false,
            minify: HtmlMinify::for_mode(mode),
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Produce the final page: stylesheets before `</head>`, scripts before
    /// `</body>`, minified when enabled.
    pub fn render(&self, scripts: &[String], styles: &[String]) -> String {
        let links: String = styles
            .iter()
            .map(|href| format!(r#"<link href="/{}" rel="stylesheet">"#, href.trim_start_matches('/')))
            .collect();
        let tags: String = scripts
            .iter()
            .map(|src| format!(r#"<script defer="defer" src="/{}"></script>"#, src.trim_start_matches('/')))
            .collect();

        let mut html = self.source.clone();
        if self.inject {
            html = insert_before(&html, "</head>", &links);
            html = insert_before(&html, "</body>", &tags);
        }

        match self.minify {
            Some(minify) => minify_html(&html, minify),
            None => html,
        }
    }
}

fn insert_before(html: &str, marker: &str, fragment: &str) -> String {
    if fragment.is_empty() {
        return html.to_string();
    }
    match html.rfind(marker) {
        Some(pos) => format!("{}{}{}", &html[..pos], fragment, &html[pos..]),
        None => format!("{html}{fragment}"),
    }
}

fn minify_html(html: &str, minify: HtmlMinify) -> String {
    let mut out = html.to_string();
    if minify.remove_comments {
        out = COMMENT.replace_all(&out, "").into_owned();
    }
    if minify.collapse_whitespace {
        out = INTER_TAG_SPACE.replace_all(&out, "><").into_owned();
        out = RUNS_OF_SPACE.replace_all(&out, " ").into_owned();
        out = out.trim().to_string();
    }
    out
}

fn minify_or_false<S: serde::Serializer>(
    minify: &Option<HtmlMinify>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match minify {
        Some(minify) => minify.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyPattern {
    pub from: PathBuf,
    pub to: PathBuf,
    pub ignore: Vec<String>,
}

/// A build-time plugin and its options.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "plugin", rename_all = "kebab-case")]
pub enum Plugin {
    /// Clear previous artifacts before writing
    Clean,
    /// Copy static files verbatim
    Copy { patterns: Vec<CopyPattern> },
    /// Generate the HTML shell
    Html(HtmlShell),
    /// Emit stylesheets as separate files
    #[serde(rename_all = "camelCase")]
    CssExtract {
        filename: String,
        chunk_filename: String,
    },
    /// Readable build status in the terminal
    FriendlyErrors { messages: Vec<String> },
    /// Compile-time constant replacement
    Define {
        definitions: IndexMap<String, String>,
    },
}

impl Plugin {
    pub fn name(&self) -> &'static str {
        match self {
            Plugin::Clean => "clean",
            Plugin::Copy { .. } => "copy",
            Plugin::Html(_) => "html",
            Plugin::CssExtract { .. } => "css-extract",
            Plugin::FriendlyErrors { .. } => "friendly-errors",
            Plugin::Define { .. } => "define",
        }
    }
}

/// Inputs the plugin set depends on besides the mode.
#[derive(Debug, Clone)]
pub struct PluginContext {
    pub public_dir: PathBuf,
    pub output_dir: PathBuf,
    pub html: HtmlShell,
    pub port: u16,
    pub env: EnvSnapshot,
}

pub fn select_plugins(mode: BuildMode, ctx: &PluginContext) -> Vec<Plugin> {
    let mut plugins = vec![
        Plugin::Clean,
        Plugin::Copy {
            patterns: vec![CopyPattern {
                from: ctx.public_dir.clone(),
                to: ctx.output_dir.clone(),
                ignore: vec![".*".to_string()],
            }],
        },
        Plugin::Html(ctx.html.clone()),
    ];

    match mode {
        BuildMode::Production => {
            let css = OutputNamingScheme::for_category(mode, AssetCategory::Style).template();
            plugins.push(Plugin::CssExtract {
                filename: css.clone(),
                chunk_filename: css,
            });
        }
        BuildMode::Development => {
            plugins.push(Plugin::FriendlyErrors {
                messages: vec![format!(
                    "Your application is running here: http://localhost:{}",
                    ctx.port
                )],
            });
            plugins.push(Plugin::Define {
                definitions: ctx.env.definitions(),
            });
        }
    }

    plugins
}
