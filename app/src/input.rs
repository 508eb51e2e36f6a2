//! Parsing of human-entered date-times.

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// The `datetime-local` shape: minutes precision, no offset.
pub const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid date-time {0:?}: expected YYYY-MM-DDTHH:MM or RFC 3339")]
    Malformed(String),
    #[error("{0} does not exist in the local time zone")]
    Nonexistent(String),
}

/// Parse `YYYY-MM-DDTHH:MM` in the local zone, or a full RFC 3339 timestamp.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>, InputError> {
    parse_datetime_in(input, &Local)
}

pub fn parse_datetime_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Utc>, InputError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(input, LOCAL_FORMAT)
        .map_err(|_| InputError::Malformed(input.to_string()))?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Repeated hour when clocks go back: take the first occurrence.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(InputError::Nonexistent(input.to_string())),
    }
}

/// Render `dt` in the `datetime-local` shape for `tz`.
pub fn format_local<Tz: TimeZone>(dt: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.with_timezone(tz).format(LOCAL_FORMAT).to_string()
}
