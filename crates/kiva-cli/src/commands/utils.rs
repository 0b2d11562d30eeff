//! Shared utilities for command implementations.

use std::path::{Path, PathBuf};

use figment::Figment;
use kiva_config::KivaConfig;

use crate::cli::GlobalOptions;
use crate::error::{CliError, Result, ResultExt};

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// The project root: `--cwd` when given, otherwise the current directory.
pub fn project_root(globals: &GlobalOptions) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    let root = match &globals.cwd {
        Some(dir) => resolve_path(dir, &current),
        None => current,
    };

    if !root.is_dir() {
        return Err(CliError::FileNotFound(root));
    }
    Ok(root)
}

/// Load the project configuration, letting `overrides` merge CLI flags on
/// top of file and environment sources.
pub fn load_config_with(
    root: &Path,
    globals: &GlobalOptions,
    overrides: impl FnOnce(Figment) -> Figment,
) -> Result<KivaConfig> {
    let explicit = globals.config.as_deref().map(|path| resolve_path(path, root));
    let figment = KivaConfig::figment(root, explicit.as_deref())?;

    let config: KivaConfig = overrides(figment)
        .extract()
        .with_hint("Check kiva.toml, kiva.config.json, and KIVA_* environment variables")?;
    config.validate()?;

    tracing::debug!(root = %root.display(), "configuration loaded");
    Ok(config)
}

pub fn load_config(root: &Path, globals: &GlobalOptions) -> Result<KivaConfig> {
    load_config_with(root, globals, |figment| figment)
}
