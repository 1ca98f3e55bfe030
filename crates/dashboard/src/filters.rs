//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a `0..=1` ratio as a whole percentage.
///
/// Usage in templates: `{{ row.confidence|percent }}` renders `87%`.
#[askama::filter_fn]
pub fn percent(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_percent(&value.to_string()))
}

fn format_percent(value: &str) -> String {
    value.trim().parse::<f64>().map_or_else(
        |_| value.to_string(),
        |ratio| format!("{:.0}%", (ratio * 100.0).clamp(0.0, 100.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent("0.873"), "87%");
        assert_eq!(format_percent("1"), "100%");
        assert_eq!(format_percent("0"), "0%");
        assert_eq!(format_percent("n/a"), "n/a");
    }
}
