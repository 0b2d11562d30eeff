//! Terminal output helpers.
//!
//! ```no_run
//! use kiva_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Gateway listening on http://localhost:8080");
//! ui::warning("js/vendors.js is over the 3.00 MB budget");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

mod format;
mod messages;

pub use format::{format_size, print_size_table};
pub use messages::{error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Decide once whether status messages are colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && crate::logger::should_use_colors(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
