use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

/// Get the last day of a given month.
pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap() - Duration::days(1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap() - Duration::days(1)
    }
}

/// Get the Sunday that starts the week containing `d`.
pub fn start_of_week(d: NaiveDate) -> NaiveDate {
    d - Duration::days(d.weekday().num_days_from_sunday() as i64)
}

/// Get the Saturday that ends the week containing `d`.
pub fn end_of_week(d: NaiveDate) -> NaiveDate {
    start_of_week(d) + Duration::days(6)
}

/// Get the first day of the month containing `d`.
pub fn start_of_month(d: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(d.year(), d.month(), 1).unwrap()
}

/// Get the last day of the month containing `d`.
pub fn end_of_month(d: NaiveDate) -> NaiveDate {
    last_day_of_month(d.year(), d.month())
}

/// Bucket size for a summary: one calendar day, week (Sunday–Saturday),
/// or month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    /// First day of the unit containing `d`.
    pub fn start_of(&self, d: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => d,
            Granularity::Week => start_of_week(d),
            Granularity::Month => start_of_month(d),
        }
    }

    /// Last day of the unit containing `d` (inclusive).
    pub fn end_of(&self, d: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => d,
            Granularity::Week => end_of_week(d),
            Granularity::Month => end_of_month(d),
        }
    }

    /// Advance a cursor by exactly one unit.
    pub fn advance(&self, d: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => d + Duration::days(1),
            Granularity::Week => d + Duration::days(7),
            Granularity::Month => d + Months::new(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2025, 1), d(2025, 1, 31));
        assert_eq!(last_day_of_month(2025, 2), d(2025, 2, 28));
        assert_eq!(last_day_of_month(2024, 2), d(2024, 2, 29)); // Leap year
        assert_eq!(last_day_of_month(2025, 12), d(2025, 12, 31));
    }

    #[test]
    fn test_start_of_week_is_sunday() {
        // 2025-06-18 is a Wednesday
        let wed = d(2025, 6, 18);
        assert_eq!(wed.weekday(), Weekday::Wed);
        assert_eq!(start_of_week(wed), d(2025, 6, 15));
        assert_eq!(start_of_week(wed).weekday(), Weekday::Sun);
        // A Sunday is its own week start
        assert_eq!(start_of_week(d(2025, 6, 15)), d(2025, 6, 15));
    }

    #[test]
    fn test_end_of_week_is_saturday() {
        let wed = d(2025, 6, 18);
        assert_eq!(end_of_week(wed), d(2025, 6, 21));
        assert_eq!(end_of_week(wed).weekday(), Weekday::Sat);
    }

    #[test]
    fn test_week_spans_month_boundary() {
        // 2025-03-30 is a Sunday; its week runs into April
        let tue = d(2025, 4, 1);
        assert_eq!(start_of_week(tue), d(2025, 3, 30));
        assert_eq!(end_of_week(tue), d(2025, 4, 5));
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(start_of_month(d(2025, 2, 14)), d(2025, 2, 1));
        assert_eq!(end_of_month(d(2025, 2, 14)), d(2025, 2, 28));
        assert_eq!(end_of_month(d(2024, 2, 14)), d(2024, 2, 29));
    }

    #[test]
    fn test_granularity_advance() {
        assert_eq!(Granularity::Day.advance(d(2025, 1, 31)), d(2025, 2, 1));
        assert_eq!(Granularity::Week.advance(d(2025, 1, 5)), d(2025, 1, 12));
        assert_eq!(Granularity::Month.advance(d(2025, 1, 1)), d(2025, 2, 1));
        // Month advance clamps to the shorter month
        assert_eq!(Granularity::Month.advance(d(2025, 1, 31)), d(2025, 2, 28));
    }

    #[test]
    fn test_granularity_bounds() {
        let day = d(2025, 6, 18);
        assert_eq!(Granularity::Day.start_of(day), day);
        assert_eq!(Granularity::Day.end_of(day), day);
        assert_eq!(Granularity::Week.start_of(day), d(2025, 6, 15));
        assert_eq!(Granularity::Week.end_of(day), d(2025, 6, 21));
        assert_eq!(Granularity::Month.start_of(day), d(2025, 6, 1));
        assert_eq!(Granularity::Month.end_of(day), d(2025, 6, 30));
    }
}
