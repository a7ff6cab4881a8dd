//! Value comparison helpers for the rule engine.

use std::cmp::Ordering;

use chrono::NaiveDate;

/// Lowercase, drop quote characters, collapse whitespace and trim.
pub fn normalize_for_compare(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '«' | '»'))
        .collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Order two date strings.
///
/// ISO dates are compared as calendar dates; anything else falls back to
/// plain string order, which agrees with calendar order for ISO input.
pub fn compare_dates(a: &str, b: &str) -> Ordering {
    match (parse_iso_date(a), parse_iso_date(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Display form of a quantity: integral values without a fraction.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
