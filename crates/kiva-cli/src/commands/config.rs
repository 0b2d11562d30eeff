//! Config command implementation.

use kiva_config::{BuildMode, compose};

use crate::cli::{ConfigArgs, GlobalOptions};
use crate::commands::utils;
use crate::error::{Result, ResultExt};
use crate::ui;

/// Compose the configuration for the resolved mode and print or write it.
pub async fn execute(args: ConfigArgs, globals: GlobalOptions) -> Result<()> {
    let mode = BuildMode::resolve(args.mode.as_deref());
    let root = utils::project_root(&globals)?;
    let config = utils::load_config(&root, &globals)?;

    tracing::info!("Current mode: {mode}");
    let build = compose(mode, &root, &config)?;
    let json = serde_json::to_string_pretty(&build)?;

    match args.out {
        Some(out) => {
            let path = utils::resolve_path(&out, &root);
            std::fs::write(&path, json + "\n").with_path(&path)?;
            ui::success(&format!("Wrote {} configuration to {}", mode, path.display()));
        }
        None => println!("{json}"),
    }

    Ok(())
}
