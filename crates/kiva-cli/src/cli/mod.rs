//! Command-line interface definition for kiva.
//!
//! # Command Structure
//!
//! - `kiva config` - Compose and print the bundler configuration
//! - `kiva chunk` - Explain which chunk group a module lands in
//! - `kiva budget` - Check emitted artifacts against the size budgets
//! - `kiva dev` - Run the development gateway

mod commands;
mod tests;

use clap::Parser;
use std::path::PathBuf;

pub use commands::{BudgetArgs, ChunkArgs, Command, ConfigArgs, DevArgs};

/// kiva - build configuration and development gateway for single-page apps
#[derive(Parser, Debug)]
#[command(
    name = "kiva",
    version,
    about = "Build configuration and development gateway for single-page apps",
    long_about = "kiva composes the bundler configuration for a single-page application\n\
                  (code splitting, loaders, plugins, output naming) and runs a development\n\
                  gateway that serves mock fixtures and proxies API traffic."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Config file to use instead of kiva.toml / kiva.config.json
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options every command shares.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub cwd: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn globals(&self) -> GlobalOptions {
        GlobalOptions {
            cwd: self.cwd.clone(),
            config: self.config.clone(),
        }
    }
}
