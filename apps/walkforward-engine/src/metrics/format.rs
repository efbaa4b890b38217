//! Formatting utilities for metrics and scores in human-readable text.

/// Format a ratio as a percentage string (`0.8123` -> `81.2%`).
#[must_use]
pub fn format_pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Format a ratio or amount with 2 decimal places; non-finite values read
/// `N/A`.
#[must_use]
pub fn format_ratio(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "N/A".to_string()
    }
}
