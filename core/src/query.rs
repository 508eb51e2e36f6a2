//! Query-string filters for the list and grouped-by-title endpoints.

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped in query values and path segments.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Filters accepted by `GET /appointments`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentQuery {
    pub recurrence_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AppointmentQuery {
    /// Every instance belonging to the series headed by `id`.
    pub fn series(id: impl Into<String>) -> Self {
        Self {
            recurrence_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Encoded query string without the leading `?`; empty when no filter is set.
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(id) = &self.recurrence_id {
            pairs.push(("recurrenceId", id.clone()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        join_pairs(&pairs)
    }
}

/// Date window for `GET /appointments/grouped-by-title`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateRange {
    pub fn to_query_string(&self) -> String {
        join_pairs(&[
            ("startDate", self.start_date.format("%Y-%m-%d").to_string()),
            ("endDate", self.end_date.format("%Y-%m-%d").to_string()),
        ])
    }
}

fn join_pairs(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}
