//! Kiva CLI - build configuration tooling and development gateway.
//!
//! The configuration itself lives in `kiva-config`; this crate exposes it
//! through commands and runs the development request gateway.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions
//! - [`commands`] - Individual command implementations
//! - [`gateway`] - Mock fixtures, backend proxy, and static pass-through
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal output helpers
//!
//! # Example
//!
//! ```rust
//! use kiva_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, true);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod gateway;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
