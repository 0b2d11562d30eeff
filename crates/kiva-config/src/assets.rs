//! Loader chains per file class, and the image inlining rule.
//!
//! Loader lists are kept exactly in declaration order. The bundler runs them
//! from last to first, so the last entry sees the raw file.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::Result;
use crate::mode::BuildMode;
use crate::naming::{AssetCategory, Compilation, OutputNamingScheme};
use crate::pattern::Pattern;

/// Largest image, in bytes, that is embedded as a data URI.
pub const INLINE_LIMIT: usize = 8192;

const EXTRACT_LOADER: &str = "mini-css-extract-plugin/loader";

/// One entry of a rule's `use` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoaderUse {
    pub loader: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl LoaderUse {
    pub fn plain(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: None,
        }
    }

    pub fn with_options(loader: impl Into<String>, options: Value) -> Self {
        Self {
            loader: loader.into(),
            options: Some(options),
        }
    }
}

/// Transform chain for one file class.
#[derive(Debug, Clone, Serialize)]
pub struct AssetRule {
    pub test: Pattern,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Pattern>,
    #[serde(rename = "use")]
    pub uses: Vec<LoaderUse>,
}

impl AssetRule {
    fn new(test: &str, uses: Vec<LoaderUse>) -> Result<Self> {
        Ok(Self {
            test: Pattern::new(test)?,
            issuer: None,
            exclude: None,
            uses,
        })
    }

    fn issuer(mut self, issuer: &str) -> Result<Self> {
        self.issuer = Some(Pattern::new(issuer)?);
        Ok(self)
    }

    fn exclude(mut self, exclude: &str) -> Result<Self> {
        self.exclude = Some(Pattern::new(exclude)?);
        Ok(self)
    }

    /// Whether this rule applies to `resource` imported from `issuer`.
    pub fn applies(&self, resource: &str, issuer: Option<&str>) -> bool {
        if !self.test.is_match(resource) {
            return false;
        }
        if self.exclude.as_ref().is_some_and(|ex| ex.is_match(resource)) {
            return false;
        }
        match &self.issuer {
            Some(pattern) => issuer.is_some_and(|i| pattern.is_match(i)),
            None => true,
        }
    }

    pub fn loader_names(&self) -> Vec<&str> {
        self.uses.iter().map(|u| u.loader.as_str()).collect()
    }
}

/// All rules for `mode`, in the order the bundler evaluates them.
pub fn asset_rules(mode: BuildMode) -> Result<Vec<AssetRule>> {
    let images = OutputNamingScheme::for_category(mode, AssetCategory::Image);
    let fonts = OutputNamingScheme::for_category(mode, AssetCategory::Font);

    Ok(vec![
        AssetRule::new(r"\.jsx?$", vec![LoaderUse::plain("babel-loader")])?
            .exclude("node_modules")?,
        AssetRule::new(
            r"\.tsx?$",
            vec![LoaderUse::plain("babel-loader"), LoaderUse::plain("ts-loader")],
        )?
        .exclude("node_modules")?,
        AssetRule::new(r"\.css$", style_chain(mode, false))?,
        AssetRule::new(r"\.less$", style_chain(mode, true))?,
        AssetRule::new(
            r"\.svg(\?v=\d+\.\d+\.\d+)?$",
            vec![
                LoaderUse::plain("babel-loader"),
                LoaderUse::with_options("@svgr/webpack", json!({ "babel": false, "icon": true })),
                url_loader(&images),
            ],
        )?
        .issuer(r"\.tsx?$")?,
        AssetRule::new(r"\.(png|jpe?g|gif|svg)$", vec![url_loader(&images)])?,
        AssetRule::new(
            r"\.(woff|woff2|eot|ttf|otf)$",
            vec![LoaderUse::with_options(
                "file-loader",
                json!({
                    "name": fonts.template(),
                    "publicPath": "/",
                    "esModule": false,
                }),
            )],
        )?,
    ])
}

/// Stylesheet chain: mode-dependent head, then css and postcss, then an
/// optional less step.
pub fn style_chain(mode: BuildMode, less: bool) -> Vec<LoaderUse> {
    let head = if mode.is_production() {
        EXTRACT_LOADER
    } else {
        "style-loader"
    };

    let mut chain = vec![
        LoaderUse::plain(head),
        LoaderUse::plain("css-loader"),
        LoaderUse::plain("postcss-loader"),
    ];
    if less {
        chain.push(LoaderUse::with_options(
            "less-loader",
            json!({ "lessOptions": { "javascriptEnabled": true } }),
        ));
    }
    chain
}

fn url_loader(images: &OutputNamingScheme) -> LoaderUse {
    LoaderUse::with_options(
        "url-loader",
        json!({
            "limit": INLINE_LIMIT,
            "fallback": "file-loader",
            "name": images.template(),
            "publicPath": "/",
            "esModule": false,
        }),
    )
}

/// Every rule that applies to `resource`, in evaluation order.
pub fn matching_rules<'r>(
    rules: &'r [AssetRule],
    resource: &str,
    issuer: Option<&str>,
) -> Vec<&'r AssetRule> {
    rules
        .iter()
        .filter(|rule| rule.applies(resource, issuer))
        .collect()
}

/// The first rule that applies to `resource`.
pub fn rule_for<'r>(
    rules: &'r [AssetRule],
    resource: &str,
    issuer: Option<&str>,
) -> Option<&'r AssetRule> {
    rules.iter().find(|rule| rule.applies(resource, issuer))
}

/// Coarse classification of a source file by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Script,
    TypedScript,
    Stylesheet,
    Less,
    /// Vector image imported from typed script, turned into a component
    Icon,
    Image,
    Font,
    Other,
}

impl AssetClass {
    pub fn of(resource: &str, issuer: Option<&str>) -> Self {
        let path = resource.split('?').next().unwrap_or(resource);
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let typed_issuer = issuer.is_some_and(|i| i.ends_with(".ts") || i.ends_with(".tsx"));

        match ext.as_str() {
            "js" | "jsx" => AssetClass::Script,
            "ts" | "tsx" => AssetClass::TypedScript,
            "css" => AssetClass::Stylesheet,
            "less" => AssetClass::Less,
            "svg" if typed_issuer => AssetClass::Icon,
            "png" | "jpg" | "jpeg" | "gif" | "svg" => AssetClass::Image,
            "woff" | "woff2" | "eot" | "ttf" | "otf" => AssetClass::Font,
            _ => AssetClass::Other,
        }
    }
}

/// Where an image or font ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEmission {
    /// Embedded in the referencing output
    Inline { data_uri: String },
    /// Written as a standalone file at this output-relative path
    File { path: String },
}

impl AssetEmission {
    pub fn is_inline(&self) -> bool {
        matches!(self, AssetEmission::Inline { .. })
    }
}

/// Apply the inlining rule: at most [`INLINE_LIMIT`] bytes is embedded.
pub fn emit_image(
    mode: BuildMode,
    name: &str,
    extension: &str,
    bytes: &[u8],
    compilation: &Compilation,
) -> AssetEmission {
    if bytes.len() <= INLINE_LIMIT {
        return AssetEmission::Inline {
            data_uri: format!(
                "data:{};base64,{}",
                mime_for(extension),
                STANDARD.encode(bytes)
            ),
        };
    }

    let naming = OutputNamingScheme::for_category(mode, AssetCategory::Image);
    AssetEmission::File {
        path: naming.render(name, extension, bytes, compilation),
    }
}

/// Fonts are never embedded.
pub fn emit_font(
    mode: BuildMode,
    name: &str,
    extension: &str,
    bytes: &[u8],
    compilation: &Compilation,
) -> AssetEmission {
    let naming = OutputNamingScheme::for_category(mode, AssetCategory::Font);
    AssetEmission::File {
        path: naming.render(name, extension, bytes, compilation),
    }
}

/// What becomes of a processed stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleArtifact {
    /// Separate stylesheet file
    Extracted { path: String },
    /// Applied at runtime by the injection loader, no file emitted
    Injected,
}

pub fn emit_stylesheet(
    mode: BuildMode,
    name: &str,
    css: &[u8],
    compilation: &Compilation,
) -> StyleArtifact {
    if !mode.is_production() {
        return StyleArtifact::Injected;
    }

    let naming = OutputNamingScheme::for_category(mode, AssetCategory::Style);
    StyleArtifact::Extracted {
        path: naming.render(name, "css", css, compilation),
    }
}

fn mime_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
