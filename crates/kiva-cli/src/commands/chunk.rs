//! Chunk command implementation.
//!
//! Explains, per resource, which cache group claims it and which loader
//! chains transform it.

use kiva_config::{
    AssetRule, BuildMode, ChunkDecision, ModuleInfo, SplittingPolicy, asset_rules, matching_rules,
};

use crate::cli::{ChunkArgs, GlobalOptions};
use crate::error::Result;
use crate::ui::format_size;

pub async fn execute(args: ChunkArgs, _globals: GlobalOptions) -> Result<()> {
    let mode = BuildMode::resolve(args.mode.as_deref());
    tracing::debug!("Current mode: {mode}");
    let policy = SplittingPolicy::standard()?;
    let rules = asset_rules(mode)?;

    for resource in &args.resources {
        let module = ModuleInfo::new(resource)
            .with_size(args.size)
            .with_chunks(args.chunks);
        println!("{}", explain(&policy, &rules, &module, args.issuer.as_deref()));
    }

    Ok(())
}

/// One report line per resource.
pub fn explain(
    policy: &SplittingPolicy,
    rules: &[AssetRule],
    module: &ModuleInfo<'_>,
    issuer: Option<&str>,
) -> String {
    let destination = match policy.classify(module) {
        ChunkDecision::Enforced(group) => format!("{} (enforced)", group.name),
        ChunkDecision::Bounded { group, bounds } => format!(
            "{} (priority {}, {}..{})",
            group.name,
            group.priority,
            format_size(bounds.min_size),
            format_size(bounds.max_size)
        ),
        ChunkDecision::Default => "default".to_string(),
    };

    let chains: Vec<String> = matching_rules(rules, module.resource, issuer)
        .iter()
        .map(|rule| rule.loader_names().join(" ← "))
        .collect();
    let loaders = if chains.is_empty() {
        "no loaders".to_string()
    } else {
        chains.join(" | ")
    };

    format!("{} → {} [{}]", module.resource, destination, loaders)
}
