//! Command implementations for the kiva CLI.
//!
//! - [`config`] - Compose and print the bundler configuration
//! - [`chunk`] - Explain cache-group and loader assignment for modules
//! - [`budget`] - Check emitted artifacts against performance budgets
//! - [`dev`] - Development gateway (mock, proxy, static)
//!
//! Each command module provides an `execute` function taking its parsed
//! arguments plus the global options.

pub mod budget;
pub mod chunk;
pub mod config;
pub mod dev;
pub(crate) mod utils;

pub use budget::execute as budget_execute;
pub use chunk::execute as chunk_execute;
pub use config::execute as config_execute;
pub use dev::execute as dev_execute;
