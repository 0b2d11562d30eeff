//! Budget command implementation.
//!
//! Walks an output directory and compares every emitted asset, and the
//! page's entrypoint (everything the HTML shell loads), against the
//! configured performance budget.

use std::path::Path;
use std::sync::LazyLock;

use kiva_config::{BudgetWarning, PerformanceBudget, SizedItem};
use regex::Regex;
use walkdir::WalkDir;

use crate::cli::{BudgetArgs, GlobalOptions};
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;

static PAGE_ASSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:src|href)="/?([^"]+\.(?:js|css))""#).expect("asset reference pattern is valid")
});

pub async fn execute(args: BudgetArgs, globals: GlobalOptions) -> Result<()> {
    let root = utils::project_root(&globals)?;
    let config = utils::load_config(&root, &globals)?;
    let dir = utils::resolve_path(args.dir.as_deref().unwrap_or(&config.output_dir), &root);

    let report = scan(&dir, &config.dev_server.index, &config.performance)?;
    ui::print_size_table(
        "Assets",
        &report
            .assets
            .iter()
            .map(|a| (a.name.clone(), a.size))
            .collect::<Vec<_>>(),
        config.performance.max_asset_size,
    );

    if report.warnings.is_empty() {
        ui::success("All assets are within budget");
    } else {
        for warning in &report.warnings {
            ui::warning(&warning.to_string());
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct BudgetReport {
    pub assets: Vec<SizedItem>,
    pub entrypoints: Vec<SizedItem>,
    pub warnings: Vec<BudgetWarning>,
}

/// Measure `dir`. Source maps are not counted.
pub fn scan(dir: &Path, index: &str, budget: &PerformanceBudget) -> Result<BudgetReport> {
    if !dir.is_dir() {
        return Err(CliError::FileNotFound(dir.to_path_buf()));
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| CliError::Io(e.into()))?;
        if !entry.file_type().is_file() || entry.path().extension().is_some_and(|e| e == "map") {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        assets.push(SizedItem::new(name, entry.metadata().map_err(|e| CliError::Io(e.into()))?.len()));
    }

    let entrypoints = match std::fs::read_to_string(dir.join(index)) {
        Ok(html) => vec![SizedItem::new("main", page_size(&html, &assets))],
        Err(_) => {
            tracing::debug!("No {index} in {}, skipping entrypoint budget", dir.display());
            Vec::new()
        }
    };

    let warnings = budget.check(&assets, &entrypoints);
    Ok(BudgetReport {
        assets,
        entrypoints,
        warnings,
    })
}

/// Total size of the scripts and stylesheets `html` references.
fn page_size(html: &str, assets: &[SizedItem]) -> u64 {
    PAGE_ASSET
        .captures_iter(html)
        .filter_map(|caps| {
            let referenced = caps.get(1)?.as_str();
            assets.iter().find(|a| a.name == referenced).map(|a| a.size)
        })
        .sum()
}
