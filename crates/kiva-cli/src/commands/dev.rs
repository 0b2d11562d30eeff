//! Dev command implementation.
//!
//! Loads the configuration with CLI overrides on top, reads the fixture file
//! if one exists, and runs the gateway until Ctrl-C.

use figment::Figment;
use figment::providers::Serialized;
use kiva_config::KivaConfig;
use tokio::net::TcpListener;

use crate::cli::{DevArgs, GlobalOptions};
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::gateway::{FixtureSet, Gateway};
use crate::ui;

pub async fn execute(args: DevArgs, globals: GlobalOptions) -> Result<()> {
    let root = utils::project_root(&globals)?;
    let config = resolve_config(&root, &globals, &args)?;
    let options = &config.dev_server;

    let fixtures = FixtureSet::load_optional(&root.join(&options.mock.fixtures))?;
    if let Some(set) = &fixtures {
        ui::info(&format!(
            "Serving {} fixture(s) under {}",
            set.len(),
            options.mock.prefix
        ));
    }
    for (context, rule) in &options.proxy {
        ui::info(&format!("Proxying {context} → {}", rule.target));
    }

    let gateway = Gateway::new(options, &root, fixtures)?;
    let listener = TcpListener::bind((options.host.as_str(), options.port))
        .await
        .map_err(|e| {
            CliError::Server(format!(
                "Failed to bind {}:{}: {e}",
                options.host, options.port
            ))
        })?;

    let addr = listener
        .local_addr()
        .map_err(|e| CliError::Server(e.to_string()))?;
    ui::success(&format!("Gateway listening on http://{addr}"));

    gateway.serve(listener).await
}

/// Configuration with the dev flags merged in as the highest layer.
pub fn resolve_config(
    root: &std::path::Path,
    globals: &GlobalOptions,
    args: &DevArgs,
) -> Result<KivaConfig> {
    let mut config = utils::load_config_with(root, globals, |figment| overrides(figment, args))?;

    if let Some(target) = &args.proxy_target {
        for rule in config.dev_server.proxy.values_mut() {
            rule.target = target.clone();
        }
        config.validate()?;
    }
    Ok(config)
}

fn overrides(mut figment: Figment, args: &DevArgs) -> Figment {
    if let Some(port) = args.port {
        figment = figment.merge(Serialized::default("devServer.port", port));
    }
    if let Some(host) = &args.host {
        figment = figment.merge(Serialized::default("devServer.host", host));
    }
    if let Some(fixtures) = &args.fixtures {
        figment = figment.merge(Serialized::default("devServer.mock.fixtures", fixtures));
    }
    if let Some(base) = &args.content_base {
        figment = figment.merge(Serialized::default("devServer.contentBase", base));
    }
    figment
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn flags_override_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("kiva.toml"),
            "[devServer]\nport = 9000\nhost = \"0.0.0.0\"\n",
        )
        .unwrap();

        let args = DevArgs {
            port: Some(9100),
            fixtures: Some("fixtures/api.json".into()),
            ..Default::default()
        };
        let config = resolve_config(dir.path(), &GlobalOptions::default(), &args).unwrap();

        assert_eq!(config.dev_server.port, 9100);
        assert_eq!(config.dev_server.host, "0.0.0.0");
        assert_eq!(
            config.dev_server.mock.fixtures,
            std::path::PathBuf::from("fixtures/api.json")
        );
    }

    #[test]
    fn proxy_target_applies_to_every_rule() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("kiva.toml"),
            "[devServer.proxy.\"/auth\"]\ntarget = \"http://auth.internal\"\n",
        )
        .unwrap();

        let args = DevArgs {
            proxy_target: Some("http://127.0.0.1:4000".into()),
            ..Default::default()
        };
        let config = resolve_config(dir.path(), &GlobalOptions::default(), &args).unwrap();

        assert!(!config.dev_server.proxy.is_empty());
        assert!(
            config
                .dev_server
                .proxy
                .values()
                .all(|rule| rule.target == "http://127.0.0.1:4000")
        );
    }

    #[test]
    fn invalid_proxy_target_is_rejected() {
        let dir = TempDir::new().unwrap();
        let args = DevArgs {
            proxy_target: Some("not a url".into()),
            ..Default::default()
        };
        assert!(resolve_config(dir.path(), &GlobalOptions::default(), &args).is_err());
    }
}
