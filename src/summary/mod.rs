pub mod bucket;
pub mod formula;
pub mod timeframe;

pub use formula::Formula;
pub use timeframe::Timeframe;

use chrono::NaiveDate;
use serde::Serialize;

use crate::date_util::Granularity;
use self::bucket::{assign_observations, generate_buckets};

/// One recorded value for a metric on a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// One reduced bucket in a summary, oldest first. `value` is `None`
/// when the bucket received no observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketResult {
    pub value: Option<f64>,
    pub label: String,
}

/// Reduce a fetched observation series into labeled bucket results.
///
/// Pure and synchronous: buckets are generated over
/// `[aligned_start, now]`, observations are assigned by inclusive
/// containment, and each bucket is reduced under `formula`. The input
/// slice is whatever the fetch window produced; dates outside the
/// generated buckets are dropped during assignment.
pub fn summarize(
    aligned_start: NaiveDate,
    granularity: Granularity,
    now: NaiveDate,
    observations: &[Observation],
    formula: &Formula,
) -> Vec<BucketResult> {
    let mut buckets = generate_buckets(aligned_start, granularity, now);
    assign_observations(&mut buckets, observations);
    buckets
        .iter()
        .map(|b| BucketResult {
            value: formula.reduce(&b.values, granularity, b.day_span()),
            label: b.label(granularity),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_daily_sums_over_a_week() {
        let now = d(2025, 6, 18);
        let observations = vec![
            Observation { date: d(2025, 6, 11), value: 2.0 },
            Observation { date: d(2025, 6, 11), value: 4.0 },
            Observation { date: d(2025, 6, 15), value: 6.0 },
        ];
        let results = summarize(
            d(2025, 6, 11),
            Granularity::Day,
            now,
            &observations,
            &Formula::Sum,
        );
        assert_eq!(results.len(), 8);
        assert_eq!(results[0].value, Some(6.0));
        assert_eq!(results[0].label, "Jun 11, 2025");
        assert_eq!(results[4].value, Some(6.0));
        assert_eq!(results[1].value, None);
    }

    #[test]
    fn test_weekly_pass_rate() {
        // One week bucket, Jun 15–21; 2 of 7 days exceed the threshold
        let now = d(2025, 6, 21);
        let observations = vec![
            Observation { date: d(2025, 6, 15), value: 6.0 },
            Observation { date: d(2025, 6, 16), value: 7.0 },
            Observation { date: d(2025, 6, 17), value: 1.0 },
        ];
        let results = summarize(
            d(2025, 6, 15),
            Granularity::Week,
            now,
            &observations,
            &Formula::PassRate(5.0),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, Some(28.6));
        assert_eq!(results[0].label, "Jun 15 – Jun 21, 2025");
    }

    #[test]
    fn test_monthly_avg_ordering() {
        let now = d(2025, 3, 10);
        let observations = vec![
            Observation { date: d(2025, 1, 10), value: 10.0 },
            Observation { date: d(2025, 2, 10), value: 20.0 },
            Observation { date: d(2025, 3, 1), value: 30.0 },
            Observation { date: d(2025, 3, 2), value: 50.0 },
        ];
        let results = summarize(
            d(2025, 1, 1),
            Granularity::Month,
            now,
            &observations,
            &Formula::Avg,
        );
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].value, Some(10.0));
        assert_eq!(results[1].value, Some(20.0));
        assert_eq!(results[2].value, Some(40.0));
    }

    #[test]
    fn test_empty_observations_yield_all_none() {
        let results = summarize(
            d(2025, 6, 1),
            Granularity::Week,
            d(2025, 6, 28),
            &[],
            &Formula::CountAbove(3.0),
        );
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.value.is_none()));
    }
}
