// 📅 Date Codec - Buddhist-era display dates ↔ canonical Gregorian dates
//
// Display form:   DD/MM/YY or DD/MM/YYYY, year in the Buddhist era (2568 = 2025)
// Canonical form: YYYY-MM-DD, Gregorian, used for every equality comparison
//
// Only years >= 2500 are treated as Buddhist era. A four digit year below 2500
// is taken as already Gregorian and is not shifted.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Offset between the Buddhist era and the Gregorian calendar
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Two digit years are read as 25YY in the Buddhist era
pub const TWO_DIGIT_ERA_BASE: i32 = 2500;

// Explicit ASCII classes: `\d` would also accept Thai and other Unicode digits.
static DATE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{2}|[0-9]{4})$").expect("date-like pattern")
});

static CANONICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("canonical pattern"));

// ============================================================================
// SYNTACTIC CHECKS
// ============================================================================

/// True iff `s` is exactly `DD/DD/DD` or `DD/DD/DDDD`.
///
/// Purely syntactic: `99/99/99` is date-like even though it is not a date.
pub fn is_date_like(s: &str) -> bool {
    DATE_LIKE.is_match(s)
}

/// True iff `s` looks like a stored canonical date (`DDDD-DD-DD`)
pub fn is_canonical(s: &str) -> bool {
    CANONICAL.is_match(s)
}

/// Already in display form: date-like with a four digit year >= 2500
fn is_display_form(s: &str) -> bool {
    DATE_LIKE
        .captures(s)
        .and_then(|caps| {
            let year = &caps[3];
            if year.len() != 4 {
                return None;
            }
            year.parse::<i32>().ok()
        })
        .map(|year| year >= TWO_DIGIT_ERA_BASE)
        .unwrap_or(false)
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Parse a date-like display string into a Gregorian calendar date.
///
/// Returns `None` when `s` is not date-like or when the day/month/year triple
/// is not a real calendar date (`31/02/2568`, `32/01/2568`, `15/13/2568`).
pub fn parse_display_date(s: &str) -> Option<NaiveDate> {
    let caps = DATE_LIKE.captures(s)?;

    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;

    if year < 100 {
        year += TWO_DIGIT_ERA_BASE;
    }
    if year >= TWO_DIGIT_ERA_BASE {
        year -= BUDDHIST_ERA_OFFSET;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Convert a date-like display string to canonical `YYYY-MM-DD`.
///
/// Example: `05/07/68` and `05/07/2568` both become `2025-07-05`.
pub fn to_canonical(s: &str) -> Option<String> {
    parse_display_date(s).map(format_canonical)
}

/// Render a calendar date in canonical form
pub fn format_canonical(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Render a Gregorian calendar date as `DD/MM/YYYY` in the Buddhist era
pub fn format_display(date: NaiveDate) -> String {
    format!(
        "{:02}/{:02}/{}",
        date.day(),
        date.month(),
        date.year() + BUDDHIST_ERA_OFFSET
    )
}

/// Convert a stored value to its display form.
///
/// - Display-form dates (four digit year >= 2500) are returned unchanged.
/// - Canonical dates and timestamps are shown as `DD/MM/YYYY` (Buddhist era).
/// - Anything else is not a date and is returned unchanged.
pub fn to_display(value: &str) -> String {
    if is_display_form(value) {
        return value.to_string();
    }

    match parse_generic_date(value) {
        Some(date) => format_display(date),
        None => value.to_string(),
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DDTHH:MM:SS`
fn parse_generic_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|ts| ts.date())
}

// ============================================================================
// TESTS
// ============================================================================
