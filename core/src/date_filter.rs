//! Fixed date windows for the chart and the list below it.
//!
//! Windows are computed from a calendar date in the user's local time zone
//! and are half-open: `start_date` midnight inclusive, `end_date` midnight
//! exclusive. The "all" window is a wide fixed range.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Days, LocalResult, Months, NaiveDate, NaiveTime, TimeZone, Utc,
};

use crate::query::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateFilterKey {
    #[default]
    Today,
    Week,
    Month,
    All,
}

impl DateFilterKey {
    pub const ALL: [DateFilterKey; 4] = [
        DateFilterKey::Today,
        DateFilterKey::Week,
        DateFilterKey::Month,
        DateFilterKey::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DateFilterKey::Today => "today",
            DateFilterKey::Week => "week",
            DateFilterKey::Month => "month",
            DateFilterKey::All => "all",
        }
    }
}

impl fmt::Display for DateFilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "today" => Ok(DateFilterKey::Today),
            "week" => Ok(DateFilterKey::Week),
            "month" => Ok(DateFilterKey::Month),
            "all" => Ok(DateFilterKey::All),
            other => Err(format!("unknown filter `{other}` (today, week, month, all)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    pub label: &'static str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateFilter {
    pub fn range(&self) -> DateRange {
        DateRange {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Whether an appointment starting at `start` falls in this window when
    /// calendar days are read in `tz`.
    pub fn contains<Tz: TimeZone>(&self, start: DateTime<Utc>, tz: &Tz) -> bool {
        let lower = local_midnight(self.start_date, tz);
        let upper = local_midnight(self.end_date, tz);
        lower <= start && start < upper
    }
}

/// The four windows, keyed by `DateFilterKey`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilters {
    pub today: DateFilter,
    pub week: DateFilter,
    pub month: DateFilter,
    pub all: DateFilter,
}

impl DateFilters {
    pub fn get(&self, key: DateFilterKey) -> &DateFilter {
        match key {
            DateFilterKey::Today => &self.today,
            DateFilterKey::Week => &self.week,
            DateFilterKey::Month => &self.month,
            DateFilterKey::All => &self.all,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DateFilterKey, &DateFilter)> {
        DateFilterKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }
}

/// Compute the windows relative to `today`.
pub fn date_filters(today: NaiveDate) -> DateFilters {
    let tomorrow = today + Days::new(1);

    let week_start = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
    let week_end = week_start + Days::new(7);

    let month_start = today.with_day(1).unwrap_or(today);
    let month_end = month_start + Months::new(1);

    DateFilters {
        today: DateFilter {
            label: "Today",
            start_date: today,
            end_date: tomorrow,
        },
        week: DateFilter {
            label: "This Week",
            start_date: week_start,
            end_date: week_end,
        },
        month: DateFilter {
            label: "This Month",
            start_date: month_start,
            end_date: month_end,
        },
        all: DateFilter {
            label: "All",
            start_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN),
            end_date: NaiveDate::from_ymd_opt(2100, 12, 31).unwrap_or(NaiveDate::MAX),
        },
    }
}

/// First instant of `date` in `tz`. On a DST gap the earliest valid instant
/// after midnight is used.
fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::default());
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = midnight + chrono::Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_spans_one_day() {
        let f = date_filters(date(2024, 5, 8));
        assert_eq!(f.today.start_date, date(2024, 5, 8));
        assert_eq!(f.today.end_date, date(2024, 5, 9));
    }

    #[test]
    fn week_runs_sunday_to_sunday() {
        // 2024-05-08 is a Wednesday.
        let f = date_filters(date(2024, 5, 8));
        assert_eq!(f.week.start_date, date(2024, 5, 5));
        assert_eq!(f.week.end_date, date(2024, 5, 12));
    }

    #[test]
    fn week_starts_today_on_sunday() {
        let f = date_filters(date(2024, 5, 5));
        assert_eq!(f.week.start_date, date(2024, 5, 5));
    }

    #[test]
    fn week_crosses_month_boundary() {
        let f = date_filters(date(2024, 6, 1));
        assert_eq!(f.week.start_date, date(2024, 5, 26));
        assert_eq!(f.week.end_date, date(2024, 6, 2));
    }

    #[test]
    fn month_runs_to_first_of_next_month() {
        let f = date_filters(date(2024, 12, 15));
        assert_eq!(f.month.start_date, date(2024, 12, 1));
        assert_eq!(f.month.end_date, date(2025, 1, 1));
    }

    #[test]
    fn all_is_fixed_wide_range() {
        let f = date_filters(date(2024, 5, 8));
        assert_eq!(f.all.start_date, date(1970, 1, 1));
        assert_eq!(f.all.end_date, date(2100, 12, 31));
    }

    #[test]
    fn today_window_uses_local_calendar_day() {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let f = date_filters(date(2024, 5, 8));
        // 02:00 UTC on the 8th is still the 7th at UTC-3.
        let late_previous_day = Utc.with_ymd_and_hms(2024, 5, 8, 2, 0, 0).unwrap();
        let local_morning = Utc.with_ymd_and_hms(2024, 5, 8, 12, 0, 0).unwrap();
        let local_last_minute = Utc.with_ymd_and_hms(2024, 5, 9, 2, 59, 0).unwrap();
        let next_local_day = Utc.with_ymd_and_hms(2024, 5, 9, 3, 0, 0).unwrap();
        assert!(!f.today.contains(late_previous_day, &tz));
        assert!(f.today.contains(local_morning, &tz));
        assert!(f.today.contains(local_last_minute, &tz));
        assert!(!f.today.contains(next_local_day, &tz));
    }

    #[test]
    fn keys_parse_and_iterate_in_order() {
        assert_eq!("Week".parse::<DateFilterKey>(), Ok(DateFilterKey::Week));
        assert!("year".parse::<DateFilterKey>().is_err());
        let f = date_filters(date(2024, 5, 8));
        let labels: Vec<_> = f.iter().map(|(_, filter)| filter.label).collect();
        assert_eq!(labels, vec!["Today", "This Week", "This Month", "All"]);
    }
}
