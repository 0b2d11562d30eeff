//! Tests for assembling the full build configuration.

use kiva_config::{
    AssetEmission, BuildMode, Compilation, ConfigError, EnvSnapshot, KivaConfig, Plugin,
    StyleArtifact, compose_with_env, emit_image, emit_stylesheet,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SHELL: &str = "<!DOCTYPE html>\n<html>\n  <head>\n    <title>app</title>\n  </head>\n  <body>\n    <div id=\"root\"></div>\n  </body>\n</html>\n";

fn project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let config_dir = dir.path().join("src/config");
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(config_dir.join("index.html"), SHELL).expect("write template");
    dir
}

fn env() -> EnvSnapshot {
    EnvSnapshot::from_lookup("linux", |key| match key {
        "WDS_SOCKET_HOST" => Some("0.0.0.0".to_string()),
        _ => None,
    })
}

fn compose(mode: BuildMode, root: &Path) -> kiva_config::BuildConfig {
    compose_with_env(mode, root, &KivaConfig::default(), env()).expect("compose")
}

#[test]
fn production_document_shape() {
    let dir = project();
    let config = compose(BuildMode::Production, dir.path());
    let value = config.to_value().expect("serialize");

    assert_eq!(value["mode"], "production");
    assert_eq!(value["stats"], "errors-only");
    assert_eq!(value["devtool"], false);
    assert_eq!(value["entry"], serde_json::json!(["./src/index.tsx"]));
    assert_eq!(value["output"]["filename"], "js/[name].[chunkhash:8].js");
    assert_eq!(value["output"]["publicPath"], "/");
    assert_eq!(
        value["resolve"]["extensions"],
        serde_json::json!([".js", ".ts", ".jsx", ".tsx"])
    );
    assert_eq!(value["module"]["rules"].as_array().map(Vec::len), Some(7));
    assert_eq!(
        value["optimization"]["minimizer"],
        serde_json::json!(["terser", "css-minimizer"])
    );
    assert_eq!(value["performance"]["maxAssetSize"], 3 * 1024 * 1024);
    assert_eq!(value["devServer"]["port"], 8080);
}

#[test]
fn dev_server_carries_quiet_stats_preset() {
    let dir = project();
    for mode in [BuildMode::Development, BuildMode::Production] {
        let value = compose(mode, dir.path()).to_value().expect("serialize");
        assert_eq!(
            value["devServer"]["stats"],
            serde_json::json!({
                "assets": false,
                "children": false,
                "chunks": false,
                "chunkModules": false,
                "colors": true,
                "entrypoints": false,
                "hash": false,
                "modules": false,
                "timings": false,
                "version": false,
            })
        );
    }
}

#[test]
fn production_has_no_define_and_minifies_html() {
    let dir = project();
    let config = compose(BuildMode::Production, dir.path());

    assert!(!config.plugins.iter().any(|p| matches!(p, Plugin::Define { .. })));
    let shell = config.html_shell().expect("html plugin");
    let html = shell.render(&["js/main.1a2b3c4d.js".to_string()], &[]);
    assert!(!html.contains("\n  "));
    assert!(html.contains(r#"<script defer="defer" src="/js/main.1a2b3c4d.js"></script>"#));
}

#[test]
fn development_entry_prepends_hot_client() {
    let dir = project();
    let config = compose(BuildMode::Development, dir.path());

    assert_eq!(
        config.entry,
        ["react-dev-utils/webpackHotDevClient", "./src/index.tsx"]
    );
    assert_eq!(config.devtool.as_deref(), Some("cheap-module-source-map"));
    assert_eq!(config.output.filename, "js/[name].[fullhash:8].js");
}

#[test]
fn development_defines_only_allow_listed_env() {
    let dir = project();
    let config = compose(BuildMode::Development, dir.path());

    let definitions = config
        .plugins
        .iter()
        .find_map(|p| match p {
            Plugin::Define { definitions } => Some(definitions.clone()),
            _ => None,
        })
        .expect("define plugin");

    assert_eq!(definitions["process.platform"], "\"linux\"");
    assert_eq!(definitions["process.env.WDS_SOCKET_HOST"], "\"0.0.0.0\"");
    // Port is its own variable, not a copy of the host.
    assert_eq!(definitions["process.env.WDS_SOCKET_PORT"], "undefined");
    assert!(!definitions.keys().any(|k| k == "process.env.HOME"));
}

#[test]
fn missing_template_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let err = compose_with_env(
        BuildMode::Production,
        dir.path(),
        &KivaConfig::default(),
        env(),
    )
    .unwrap_err();

    match err {
        ConfigError::Template { path, .. } => assert!(path.ends_with("src/config/index.html")),
        other => panic!("expected Template error, got {other:?}"),
    }
}

#[test]
fn aliases_are_rooted_in_project() {
    let dir = project();
    let config = compose(BuildMode::Production, dir.path());

    assert_eq!(config.resolve.alias["@"], dir.path().join("src"));
    assert_eq!(config.resolve.alias["config"], dir.path().join("src/config"));
    assert_eq!(config.output.path, dir.path().join("build"));
}

#[test]
fn production_names_survive_unrelated_rebuilds() {
    let bytes = vec![7u8; 10_000];
    let first = emit_image(BuildMode::Production, "logo", "png", &bytes, &Compilation::new());
    let second = emit_image(BuildMode::Production, "logo", "png", &bytes, &Compilation::new());

    assert!(matches!(first, AssetEmission::File { .. }));
    assert_eq!(first, second);

    let css = b"body { margin: 0 }";
    assert_eq!(
        emit_stylesheet(BuildMode::Production, "main", css, &Compilation::new()),
        emit_stylesheet(BuildMode::Production, "main", css, &Compilation::new())
    );
}

#[test]
fn development_names_change_every_compilation() {
    let bytes = vec![7u8; 10_000];
    let first = emit_image(BuildMode::Development, "logo", "png", &bytes, &Compilation::new());
    let second = emit_image(BuildMode::Development, "logo", "png", &bytes, &Compilation::new());
    assert_ne!(first, second);

    assert_eq!(
        emit_stylesheet(BuildMode::Development, "main", b"a{}", &Compilation::new()),
        StyleArtifact::Injected
    );
}
