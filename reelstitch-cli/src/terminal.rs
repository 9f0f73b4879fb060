//! Terminal UI components and styling for reelstitch.
//!
//! Everything here prints through the `log` facade at info level, so the
//! same lines reach the console and, once attached, the run log file (with
//! color codes stripped).

use log::info;
use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};
use supports_color::Stream;

static USE_COLOR: AtomicBool = AtomicBool::new(false);

const STATUS_INDENT: &str = "  ";
const LABEL_WIDTH: usize = 15;

/// Decides once per process whether output is colored.
///
/// Color is used only when stdout supports it and `--no-color` was not
/// given; `supports-color` already honors `NO_COLOR` and `FORCE_COLOR`.
pub fn init_color(no_color: bool) {
    let enabled = !no_color && supports_color::on(Stream::Stdout).is_some();
    USE_COLOR.store(enabled, Ordering::Relaxed);
}

pub fn should_use_color() -> bool {
    USE_COLOR.load(Ordering::Relaxed)
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan().bold());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let line = status_line(label, value, highlight && should_use_color());
    info!("{line}");
}

fn status_line(label: &str, value: &str, bold_value: bool) -> String {
    let padding = LABEL_WIDTH.saturating_sub(label.chars().count()).max(1);
    if bold_value {
        format!("{STATUS_INDENT}{label}:{}{}", " ".repeat(padding), value.bold())
    } else {
        format!("{STATUS_INDENT}{label}:{}{value}", " ".repeat(padding))
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    info!("");
    if should_use_color() {
        info!("{STATUS_INDENT}✓ {}", message.green());
    } else {
        info!("{STATUS_INDENT}✓ {message}");
    }
}

/// Print a non-fatal problem the run continued past.
///
/// Logged at info level so it stays on stdout next to the summary it
/// belongs to; real warnings go through `log::warn!`.
pub fn print_notice(message: &str) {
    if should_use_color() {
        info!("{STATUS_INDENT}! {}", message.yellow());
    } else {
        info!("{STATUS_INDENT}! {message}");
    }
}

/// Formats a duration as `1h 02m 03s`, `2m 05s` or `42s`.
pub fn format_duration(duration: std::time::Duration) -> String {
    let total = duration.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_line_pads_labels() {
        // Values start in the same column for every label that fits.
        let short = status_line("Input", "clips", false);
        assert_eq!(short, format!("  Input:{}clips", " ".repeat(10)));
        assert_eq!(
            short.find("clips"),
            status_line("Target length", "clips", false).find("clips")
        );
        assert_eq!(status_line("A very long label", "x", false), "  A very long label: x");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h 02m 03s");
    }
}
