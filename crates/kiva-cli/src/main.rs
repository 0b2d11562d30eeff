//! Kiva CLI entry point: argument parsing, logging setup, and dispatch.

use clap::Parser;
use kiva_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let globals = args.globals();
    let result = match args.command {
        cli::Command::Config(config_args) => commands::config_execute(config_args, globals).await,
        cli::Command::Chunk(chunk_args) => commands::chunk_execute(chunk_args, globals).await,
        cli::Command::Budget(budget_args) => commands::budget_execute(budget_args, globals).await,
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args, globals).await,
    };

    result.map_err(error::cli_error_to_miette)
}
