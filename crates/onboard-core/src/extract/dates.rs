//! Tolerant date normalization for hand-typed dates.
//!
//! Text goes through a fixed repair pipeline before parsing:
//! trim, drop ordinal suffixes, fix letter/digit typos in numeric context,
//! and re-insert a missing `/` before a trailing four-digit year. The result
//! is parsed day-first. Failure is reported as `None`, never as an error.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::trace;

use super::patterns::{DATE_FILLER, MISSING_YEAR_SEPARATOR, ORDINAL_SUFFIX, TIMESTAMP_WRAPPER};
use crate::models::value::Value;

/// Day-first formats. Two-digit years come first: `%y` rejects four-digit
/// years outright, while `%Y` would happily read "20" as year 20.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%d %m %y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %m %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d %B %Y",
    "%d-%B-%Y",
    "%d/%B/%Y",
    "%d %B %y",
    "%d-%B-%y",
    "%B %d %Y",
    "%A %d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Normalize a cell or raw field value to a calendar date.
///
/// Native date values convert directly. Text runs the repair pipeline.
/// Other scalars are rendered to text first.
pub fn normalize_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Absent => None,
        Value::Date(d) => Some(*d),
        Value::DateTime(dt) => Some(dt.date()),
        Value::Text(s) => normalize_date_text(s),
        other => normalize_date_text(&other.render()),
    }
}

/// Normalize a free-text date.
pub fn normalize_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if is_null_token(trimmed) {
        return None;
    }

    if let Some(caps) = TIMESTAMP_WRAPPER.captures(trimmed) {
        return parse_date(caps[1].trim());
    }

    let repaired = repair_date_text(trimmed);
    let parsed = parse_date(&repaired);
    trace!("date {:?} repaired to {:?} -> {:?}", text, repaired, parsed);
    parsed
}

/// Parse a timestamp cell, accepting plain dates as midnight.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if is_null_token(trimmed) {
        return None;
    }
    let inner = TIMESTAMP_WRAPPER
        .captures(trimmed)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(|| trimmed.to_string());

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&inner, fmt).ok())
        .or_else(|| parse_date(&inner).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Apply the textual repair steps without parsing.
pub fn repair_date_text(text: &str) -> String {
    let trimmed = text.trim();
    let without_ordinals = ORDINAL_SUFFIX.replace_all(trimmed, "$1");
    let fixed = repair_numeric_typos(&without_ordinals);
    let fixed = fixed.trim();
    MISSING_YEAR_SEPARATOR
        .replace(fixed, "$1/$2/$3")
        .into_owned()
}

/// Empty strings and the `NaT` sentinel mean "no date", not "bad date".
fn is_null_token(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case("nat")
}

fn is_numeric_context(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '/' | '-' | ' ')
}

/// Replace `o` with `0` and `l`/`i` with `1` where both neighbours are
/// numeric context. At a string edge the single neighbour must be a digit.
fn repair_numeric_typos(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = chars.clone();

    for (i, c) in chars.iter().enumerate() {
        let replacement = match c {
            'o' | 'O' => '0',
            'l' | 'L' | 'i' | 'I' => '1',
            _ => continue,
        };

        let left = i.checked_sub(1).map(|j| chars[j]);
        let right = chars.get(i + 1).copied();

        let numeric = match (left, right) {
            (Some(l), Some(r)) => is_numeric_context(l) && is_numeric_context(r),
            (Some(c), None) | (None, Some(c)) => c.is_ascii_digit(),
            (None, None) => false,
        };

        if numeric {
            out[i] = replacement;
        }
    }

    out.into_iter().collect()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let cleaned = DATE_FILLER.replace_all(s.trim(), " ");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(cleaned, fmt).ok())
                .map(|dt| dt.date())
        })
}
