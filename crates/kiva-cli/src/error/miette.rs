//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use crate::gateway::FixtureError;
use kiva_config::ConfigError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        CliError::Fixture(FixtureError::Parse { path, source }) => miette::miette!(
            help = "Fix the JSON or remove the file to run without mock routes",
            "Fixture file {} is malformed: {}",
            path.display(),
            source
        ),
        _ => miette::miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::Template { path, source } => miette::miette!(
            help = "Set `template` in kiva.toml or create the file",
            "HTML shell template {} is unreadable: {}",
            path.display(),
            source
        ),
        ConfigError::InvalidValue { field, message } => miette::miette!(
            help = "Check kiva.toml, kiva.config.json, and KIVA_* environment variables",
            "Invalid value for '{}': {}",
            field,
            message
        ),
        other => miette::miette!("Configuration error: {}", other),
    }
}
