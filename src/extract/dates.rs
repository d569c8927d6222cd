//! Due-date parsing
//!
//! Portals render deadlines in whatever language the account is set to, so
//! parsing walks a fixed list of formats and takes the first that fits.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// Accepted formats in the order they are tried; `true` marks date-only ones
pub const DATE_FORMATS: &[(&str, bool)] = &[
    ("%Y年%m月%d日 %H:%M", false),
    ("%Y年%m月%d日", true),
    ("%Y-%m-%d %H:%M", false),
    ("%Y-%m-%d", true),
    ("%d %B %Y, %I:%M %p", false),
    ("%d %b %Y, %I:%M %p", false),
    ("%d/%m/%Y %H:%M", false),
    ("%d/%m/%Y", true),
];

/// Parses a deadline string, or returns None if no format matches
///
/// Surrounding whitespace is ignored. Date-only formats resolve to midnight.
///
/// # Example
///
/// ```
/// use moodle_reminder::extract::parse_date;
///
/// let due = parse_date("2025年2月15日 23:59").unwrap();
/// assert_eq!(due.to_string(), "2025-02-15 23:59:00");
/// assert!(parse_date("TBD").is_none());
/// ```
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS.iter().find_map(|(format, date_only)| {
        if *date_only {
            NaiveDate::parse_from_str(text, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        } else {
            NaiveDateTime::parse_from_str(text, format).ok()
        }
    })
}

/// Converts a Unix timestamp attribute (seconds) to local wall-clock time
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let secs: i64 = value.trim().parse().ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0).map(|utc| utc.with_timezone(&Local).naive_local())
}
