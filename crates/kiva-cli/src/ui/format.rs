//! Formatting utilities for sizes and artifact listings.

use console::Term;
use owo_colors::OwoColorize;

use super::colors_enabled;

/// Format file size in human-readable format.
///
/// ```
/// use kiva_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(8192), "8.00 KB");
/// assert_eq!(format_size(3 * 1_048_576), "3.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Print a titled table of `(name, bytes)` rows to stderr, flagging rows
/// over `limit`.
///
/// # Arguments
///
/// * `title` - Heading printed above the table
/// * `rows` - Artifact names and their sizes in bytes
/// * `limit` - Size above which a row is highlighted
///
/// # Examples
///
/// ```no_run
/// use kiva_cli::ui::print_size_table;
///
/// let rows = vec![("js/main.js".to_string(), 120_000), ("css/main.css".to_string(), 8_000)];
/// print_size_table("Assets", &rows, 100_000);
/// ```
pub fn print_size_table(title: &str, rows: &[(String, u64)], limit: u64) {
    let width = (Term::stderr().size().1 as usize).clamp(20, 80);
    let color = colors_enabled();

    if color {
        eprintln!("\n{}", title.bold().underline());
    } else {
        eprintln!("\n{title}");
    }
    eprintln!("{}", "─".repeat(width));

    for (name, size) in rows {
        let size_str = format_size(*size);
        let over = *size > limit;
        match (color, over) {
            (true, true) => eprintln!("  {} {} {}", "▸".yellow(), name.bold(), size_str.yellow()),
            (true, false) => eprintln!("  {} {} {}", "▸".blue(), name, size_str.dimmed()),
            (false, true) => eprintln!("  ! {} {}", name, size_str),
            (false, false) => eprintln!("  - {} {}", name, size_str),
        }
    }

    eprintln!("{}", "─".repeat(width));
    let total: u64 = rows.iter().map(|(_, size)| size).sum();
    eprintln!("  Total: {}", format_size(total));
}
