use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available kiva subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose the bundler configuration
    ///
    /// Prints the complete configuration document as JSON, or writes it to
    /// a file with --out.
    Config(ConfigArgs),

    /// Explain chunk assignment for module paths
    ///
    /// Runs each resource through the cache groups and the loader rules and
    /// reports where it would end up.
    Chunk(ChunkArgs),

    /// Check emitted artifacts against the performance budgets
    ///
    /// Warnings only; the command always succeeds when the directory exists.
    Budget(BudgetArgs),

    /// Run the development gateway
    ///
    /// Serves fixtures under the mock prefix, forwards proxy contexts to the
    /// backend, and serves the content base for everything else.
    Dev(DevArgs),
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Build mode; anything other than `production` means development
    #[arg(short, long, env = "NODE_ENV", value_name = "MODE")]
    pub mode: Option<String>,

    /// Write the configuration to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Arguments for the chunk command
#[derive(Args, Debug)]
pub struct ChunkArgs {
    /// Module paths, e.g. /app/node_modules/react/index.js
    #[arg(required = true, value_name = "RESOURCE")]
    pub resources: Vec<String>,

    /// Number of chunks that share the module
    #[arg(long, default_value_t = 1, value_name = "N")]
    pub chunks: usize,

    /// Module size in bytes
    #[arg(long, default_value_t = 0, value_name = "BYTES")]
    pub size: u64,

    /// Importing module, consulted by issuer-scoped loader rules
    #[arg(long, value_name = "PATH")]
    pub issuer: Option<String>,

    /// Build mode; anything other than `production` means development
    #[arg(short, long, env = "NODE_ENV", value_name = "MODE")]
    pub mode: Option<String>,
}

/// Arguments for the budget command
#[derive(Args, Debug)]
pub struct BudgetArgs {
    /// Directory of emitted artifacts (defaults to the configured output dir)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Arguments for the dev command
#[derive(Args, Debug, Default)]
pub struct DevArgs {
    /// Port to listen on
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Host to bind
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Fixture file, relative to the project root
    #[arg(long, value_name = "FILE")]
    pub fixtures: Option<PathBuf>,

    /// Origin every proxy context forwards to
    #[arg(long, value_name = "ORIGIN")]
    pub proxy_target: Option<String>,

    /// Directory served for unmatched requests
    #[arg(long, value_name = "DIR")]
    pub content_base: Option<PathBuf>,
}
