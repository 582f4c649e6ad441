use chrono::NaiveDate;

use crate::date_util::Granularity;
use crate::summary::Observation;

/// A contiguous time span awaiting reduction. `end` is inclusive.
#[derive(Debug, Clone)]
pub struct Bucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// ISO date of `start`; internal join key, not the display label.
    pub key: String,
    pub values: Vec<f64>,
}

impl Bucket {
    fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            key: start.format("%Y-%m-%d").to_string(),
            values: Vec::new(),
        }
    }

    /// Inclusive containment check used by assignment.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Inclusive count of calendar days this bucket covers.
    pub fn day_span(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Human-readable label: `"Jun 18, 2025"` for day buckets,
    /// `"Jun 15 – Jun 21, 2025"` for week/month buckets.
    pub fn label(&self, granularity: Granularity) -> String {
        match granularity {
            Granularity::Day => self.start.format("%b %-d, %Y").to_string(),
            Granularity::Week | Granularity::Month => format!(
                "{} – {}",
                self.start.format("%b %-d"),
                self.end.format("%b %-d, %Y")
            ),
        }
    }
}

/// Walk from `aligned_start` through `now` emitting one bucket per
/// granularity unit. Buckets are contiguous and non-overlapping; the
/// first bucket's start may precede `aligned_start` (it is snapped to
/// the unit boundary) and the last bucket's end may exceed `now`.
/// Emits at least one bucket whenever `aligned_start <= now`.
pub fn generate_buckets(
    aligned_start: NaiveDate,
    granularity: Granularity,
    now: NaiveDate,
) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut cursor = aligned_start;
    while cursor <= now {
        buckets.push(Bucket::new(
            granularity.start_of(cursor),
            granularity.end_of(cursor),
        ));
        cursor = granularity.advance(cursor);
    }
    buckets
}

/// Place each observation into the first bucket that contains its date.
/// Observations outside every bucket are dropped; the fetch window and
/// bucket spans only disagree at the edges, so this is expected.
pub fn assign_observations(buckets: &mut [Bucket], observations: &[Observation]) {
    for obs in observations {
        match buckets.iter_mut().find(|b| b.contains(obs.date)) {
            Some(bucket) => bucket.values.push(obs.value),
            None => {
                log::debug!("dropping out-of-window observation on {}", obs.date);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(date: NaiveDate, value: f64) -> Observation {
        Observation { date, value }
    }

    #[test]
    fn test_day_buckets_cover_window() {
        let buckets = generate_buckets(d(2025, 6, 11), Granularity::Day, d(2025, 6, 18));
        assert_eq!(buckets.len(), 8);
        assert_eq!(buckets[0].start, d(2025, 6, 11));
        assert_eq!(buckets[7].start, d(2025, 6, 18));
        for b in &buckets {
            assert_eq!(b.start, b.end);
            assert_eq!(b.day_span(), 1);
        }
    }

    #[test]
    fn test_buckets_contiguous_non_overlapping() {
        for granularity in [Granularity::Day, Granularity::Week, Granularity::Month] {
            let buckets = generate_buckets(d(2025, 1, 5), granularity, d(2025, 6, 18));
            assert!(!buckets.is_empty());
            for pair in buckets.windows(2) {
                assert_eq!(
                    pair[1].start,
                    pair[0].end + Duration::days(1),
                    "gap or overlap at {granularity:?}"
                );
            }
        }
    }

    #[test]
    fn test_single_bucket_when_start_is_now() {
        let buckets = generate_buckets(d(2025, 6, 18), Granularity::Month, d(2025, 6, 18));
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].start, d(2025, 6, 1));
        assert_eq!(buckets[0].end, d(2025, 6, 30));
    }

    #[test]
    fn test_week_buckets_snap_to_sunday() {
        // Aligned start is a Monday (post-nudge); buckets still span Sun–Sat
        let buckets = generate_buckets(d(2025, 6, 16), Granularity::Week, d(2025, 6, 30));
        assert_eq!(buckets[0].start, d(2025, 6, 15));
        assert_eq!(buckets[0].end, d(2025, 6, 21));
        assert_eq!(buckets[0].day_span(), 7);
    }

    #[test]
    fn test_assignment_places_each_in_exactly_one() {
        let mut buckets = generate_buckets(d(2025, 6, 1), Granularity::Week, d(2025, 6, 28));
        let observations = vec![
            obs(d(2025, 6, 2), 1.0),
            obs(d(2025, 6, 9), 2.0),
            obs(d(2025, 6, 10), 3.0),
            obs(d(2025, 6, 28), 4.0),
        ];
        assign_observations(&mut buckets, &observations);
        let total: usize = buckets.iter().map(|b| b.values.len()).sum();
        assert_eq!(total, observations.len());
        // 6/9 and 6/10 fall in the same Sun-start week (Jun 8–14)
        let week = buckets.iter().find(|b| b.start == d(2025, 6, 8)).unwrap();
        assert_eq!(week.values, vec![2.0, 3.0]);
    }

    #[test]
    fn test_out_of_range_observation_dropped() {
        let mut buckets = generate_buckets(d(2025, 6, 11), Granularity::Day, d(2025, 6, 18));
        assign_observations(
            &mut buckets,
            &[obs(d(2025, 6, 1), 1.0), obs(d(2025, 6, 12), 2.0)],
        );
        let total: usize = buckets.iter().map(|b| b.values.len()).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_labels() {
        let day = Bucket::new(d(2025, 6, 8), d(2025, 6, 8));
        assert_eq!(day.label(Granularity::Day), "Jun 8, 2025");

        let week = Bucket::new(d(2025, 6, 8), d(2025, 6, 14));
        assert_eq!(week.label(Granularity::Week), "Jun 8 – Jun 14, 2025");

        let month = Bucket::new(d(2025, 2, 1), d(2025, 2, 28));
        assert_eq!(month.label(Granularity::Month), "Feb 1 – Feb 28, 2025");
    }

    #[test]
    fn test_key_is_iso_start() {
        let b = Bucket::new(d(2025, 6, 8), d(2025, 6, 14));
        assert_eq!(b.key, "2025-06-08");
    }
}
