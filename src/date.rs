//! Calendar-day helpers shared by the ledger, metrics, and summaries.

use chrono::{DateTime, Datelike, Days, NaiveDate, ParseError, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single local calendar day, written canonically as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// The previous calendar day, if representable.
    pub fn pred(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// The next calendar day, if representable.
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Self)
    }
}

/// Truncates an instant to its calendar day in the instant's own timezone.
///
/// Pass a `DateTime<Local>` to get the user's local day.
pub fn to_calendar_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> CalendarDate {
    CalendarDate(instant.date_naive())
}

/// Signed number of whole calendar days from `a` to `b` (`b - a`).
///
/// Both ends are date-only values, so daylight-saving transitions never
/// produce a fractional day.
pub fn days_between(a: CalendarDate, b: CalendarDate) -> i64 {
    b.0.signed_duration_since(a.0).num_days()
}

/// The last `n` calendar days ending at `end` inclusive, oldest first.
///
/// Days before the earliest representable date are left out, so near
/// `NaiveDate::MIN` the result holds fewer than `n` entries.
pub fn days_ending_at(end: CalendarDate, n: usize) -> Vec<CalendarDate> {
    (0..n as u64)
        .rev()
        .filter_map(|back| end.0.checked_sub_days(Days::new(back)))
        .map(CalendarDate)
        .collect()
}

/// The last `n` calendar days ending at the day of `reference`, oldest first.
/// `n == 0` yields an empty sequence.
pub fn last_n_days<Tz: TimeZone>(n: usize, reference: &DateTime<Tz>) -> Vec<CalendarDate> {
    days_ending_at(to_calendar_date(reference), n)
}

/// Short weekday name (`Sun` through `Sat`).
pub fn day_label(date: CalendarDate) -> &'static str {
    match date.0.weekday() {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

/// Formats a focus total as `1h 5m`, dropping the hour part when zero.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_to_calendar_date_uses_instant_timezone() {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        // Late evening locally is already the next day in UTC.
        let instant = est.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        assert_eq!(to_calendar_date(&instant), date("2024-03-10"));
        assert_eq!(to_calendar_date(&instant.with_timezone(&chrono::Utc)), date("2024-03-11"));
    }

    #[test]
    fn test_to_calendar_date_is_idempotent_through_text() {
        let instant = FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 12, 31, 0, 5, 0)
            .unwrap();
        let day = to_calendar_date(&instant);
        let reparsed: CalendarDate = day.to_string().parse().unwrap();
        assert_eq!(reparsed, day);
        assert_eq!(day.to_string(), "2024-12-31");
    }

    #[test]
    fn test_calendar_date_rejects_malformed_text() {
        assert!("2024-13-01".parse::<CalendarDate>().is_err());
        assert!("yesterday".parse::<CalendarDate>().is_err());
    }

    #[test]
    fn test_days_between_is_signed() {
        assert_eq!(days_between(date("2024-01-01"), date("2024-01-02")), 1);
        assert_eq!(days_between(date("2024-01-05"), date("2024-01-01")), -4);
        assert_eq!(days_between(date("2024-02-28"), date("2024-03-01")), 2);
        assert_eq!(days_between(date("2024-06-06"), date("2024-06-06")), 0);
    }

    #[test]
    fn test_days_between_across_dst_change() {
        // US spring-forward happened on 2024-03-10.
        assert_eq!(days_between(date("2024-03-09"), date("2024-03-10")), 1);
        assert_eq!(days_between(date("2024-03-10"), date("2024-03-11")), 1);
        // EU fall-back happened on 2024-10-27.
        assert_eq!(days_between(date("2024-10-26"), date("2024-10-28")), 2);
    }

    #[test]
    fn test_last_n_days_ends_at_reference() {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 2, 12, 0, 0)
            .unwrap();
        let days = last_n_days(7, &now);

        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date("2024-02-25"));
        assert_eq!(days[6], date("2024-03-02"));
        for pair in days.windows(2) {
            assert_eq!(days_between(pair[0], pair[1]), 1);
        }
    }

    #[test]
    fn test_last_n_days_small_counts() {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
            .unwrap();
        assert!(last_n_days(0, &now).is_empty());
        assert_eq!(last_n_days(1, &now), vec![date("2024-01-01")]);
    }

    #[test]
    fn test_days_ending_at_earliest_date() {
        let earliest = CalendarDate::from(NaiveDate::MIN);
        assert_eq!(days_ending_at(earliest, 3), vec![earliest]);

        let next = earliest.succ().unwrap();
        assert_eq!(days_ending_at(next, 3), vec![earliest, next]);
    }

    #[test]
    fn test_day_label() {
        assert_eq!(day_label(date("2024-01-07")), "Sun");
        assert_eq!(day_label(date("2024-01-08")), "Mon");
        assert_eq!(day_label(date("2024-01-13")), "Sat");
        assert_eq!(day_label(date("2000-02-29")), "Tue");
    }

    #[test]
    fn test_pred_and_succ() {
        let day = date("2024-03-01");
        assert_eq!(day.pred(), Some(date("2024-02-29")));
        assert_eq!(day.succ(), Some(date("2024-03-02")));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(1500), "25m");
        assert_eq!(format_duration(3900), "1h 5m");
        assert_eq!(format_duration(7200), "2h 0m");
        assert_eq!(format_duration(-30), "0m");
    }
}
