//! Logging infrastructure for the kiva CLI.
//!
//! Verbosity is chosen once at start-up:
//!
//! 1. `--verbose`: debug for the kiva crates and request tracing
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`, when set
//! 4. otherwise info for the kiva crates
//!
//! ```rust,no_run
//! use kiva_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("composing configuration");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "kiva=debug,kiva_config=debug,kiva_cli=debug,tower_http=debug";
const QUIET_FILTER: &str = "kiva=error,kiva_config=error,kiva_cli=error";
const DEFAULT_FILTER: &str = "kiva=info,kiva_config=info,kiva_cli=info";

/// Filter for the given flags. `verbose` wins over `quiet`.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .compact();

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// `NO_COLOR` disables, `FORCE_COLOR` forces, otherwise ask the terminal.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
