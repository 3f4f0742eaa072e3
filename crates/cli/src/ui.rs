//! Console output helpers.
//!
//! Results go to stdout; progress, warnings and errors go to stderr so
//! `--json` output stays machine readable.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a section header
pub fn print_section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
    println!("{}", "─".repeat(60).bright_black());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a labelled value
pub fn print_field(label: &str, value: &str) {
    println!("  {} {}", format!("{label}:").bright_black(), value);
}

/// Start a spinner on stderr.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Report how long a step took and the time since start.
pub fn print_timing(message: &str, step: Duration, total: Duration) {
    eprintln!(
        "{} {} {}",
        "⏱".bright_black(),
        message,
        format!(
            "completed in {} (total: {})",
            format_duration(step),
            format_duration(total)
        )
        .bright_black()
    );
}

/// Milliseconds below ten seconds, seconds with one decimal above.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 10_000 {
        format!("{millis}ms")
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

/// Check mark or dash for a configured/unconfigured flag.
#[must_use]
pub fn yes_no(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "-".bright_black().to_string()
    }
}
