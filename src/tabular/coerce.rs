//! Coercion fallback policy
//!
//! Values that fail numeric or date parsing are silently substituted
//! (numeric cells become 0, date cells become "no date") and the row is
//! never rejected for it. Aggregation totals and import both depend on this
//! substitution; tests assert on it deliberately. Do not "fix" it into an
//! error path.

use chrono::{NaiveDate, NaiveDateTime};

/// Canonical calendar-date text form used throughout the store
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted input date shapes, tried in order
const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Accepted input datetime shapes (spreadsheet exports often carry a
/// midnight time component); the date part is kept
const DATETIME_INPUT_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Decimal hours; parse failure coerces to 0.0.
pub fn hours(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

/// Integer fee in currency units; accepts decimal text and truncates
/// (`int(float(x))` semantics). Parse failure coerces to 0.
pub fn fee(raw: &str) -> i64 {
    raw.trim().parse::<f64>().map(|f| f.trunc() as i64).unwrap_or(0)
}

/// Integer count with the same truncating semantics as [`fee`].
pub fn count(raw: &str) -> i64 {
    fee(raw)
}

/// Calendar date; `None` when unparseable. Under a range filter a `None`
/// date matches nothing, even when the range is unbounded-equivalent.
pub fn date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_INPUT_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(d);
        }
    }
    for format in DATETIME_INPUT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }
    None
}

/// Normalize a date cell to the canonical text form; unparseable input
/// becomes an empty string (the null-date marker).
pub fn normalize_date(raw: &str) -> String {
    date(raw)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_hours_coerce_to_zero() {
        assert_eq!(hours("abc"), 0.0);
        assert_eq!(hours(""), 0.0);
        assert_eq!(hours(" 3.5 "), 3.5);
    }

    #[test]
    fn fee_truncates_decimal_text() {
        assert_eq!(fee("120000"), 120_000);
        assert_eq!(fee("120000.9"), 120_000);
        assert_eq!(fee("12,000"), 0);
        assert_eq!(fee("n/a"), 0);
    }

    #[test]
    fn count_matches_fee_semantics() {
        assert_eq!(count("3"), 3);
        assert_eq!(count("3.0"), 3);
        assert_eq!(count("three"), 0);
    }

    #[test]
    fn date_accepts_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(date("2026-03-02"), Some(expected));
        assert_eq!(date("2026/03/02"), Some(expected));
        assert_eq!(date("2026.03.02"), Some(expected));
        assert_eq!(date("2026-03-02 00:00:00"), Some(expected));
    }

    #[test]
    fn bad_dates_become_none() {
        assert_eq!(date(""), None);
        assert_eq!(date("soon"), None);
        assert_eq!(date("2026-13-40"), None);
    }

    #[test]
    fn normalize_date_uses_empty_string_as_null_marker() {
        assert_eq!(normalize_date("2026/03/02"), "2026-03-02");
        assert_eq!(normalize_date("soon"), "");
    }
}
