//! Tests for configuration source precedence.

use kiva_config::KivaConfig;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

fn test_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn clear_env() {
    // SAFETY: tests touching the environment hold `test_lock`.
    unsafe {
        env::remove_var("KIVA_DEV_SERVER__PORT");
        env::remove_var("KIVA_OUTPUT_DIR");
    }
}

#[test]
fn env_overrides_file() {
    let _guard = test_lock().lock().expect("lock");
    clear_env();
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("kiva.toml"),
        r#"
outputDir = "dist"

[devServer]
port = 9000
"#,
    )
    .expect("write config");

    // SAFETY: serialized by `test_lock`.
    unsafe { env::set_var("KIVA_DEV_SERVER__PORT", "9100") };
    let config = KivaConfig::load(dir.path(), None).expect("load");
    clear_env();

    assert_eq!(config.dev_server.port, 9100);
    assert_eq!(config.output_dir, PathBuf::from("dist"));
}

#[test]
fn file_preserves_unspecified_defaults() {
    let _guard = test_lock().lock().expect("lock");
    clear_env();
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("kiva.config.json"),
        r#"{ "devServer": { "mock": { "prefix": "/fixtures" } } }"#,
    )
    .expect("write config");

    let config = KivaConfig::load(dir.path(), None).expect("load");

    assert_eq!(config.dev_server.mock.prefix, "/fixtures");
    assert_eq!(config.dev_server.mock.fixtures, PathBuf::from("mocks.json"));
    assert_eq!(config.dev_server.port, 8080);
    assert!(config.dev_server.proxy.contains_key("/proxy"));
}

#[test]
fn explicit_path_wins_over_discovery() {
    let _guard = test_lock().lock().expect("lock");
    clear_env();
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("kiva.toml"), "entry = \"./src/a.tsx\"\n").expect("write");
    let explicit = dir.path().join("ci.json");
    fs::write(&explicit, r#"{ "entry": "./src/b.tsx" }"#).expect("write");

    let config = KivaConfig::load(dir.path(), Some(&explicit)).expect("load");
    assert_eq!(config.entry, "./src/b.tsx");
}

#[test]
fn invalid_mock_prefix_is_rejected() {
    let _guard = test_lock().lock().expect("lock");
    clear_env();
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("kiva.config.json"),
        r#"{ "devServer": { "mock": { "prefix": "mock" } } }"#,
    )
    .expect("write config");

    let err = KivaConfig::load(dir.path(), None).unwrap_err();
    assert!(err.to_string().contains("devServer.mock.prefix"));
}
