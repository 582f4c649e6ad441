use chrono::{Duration, Months, NaiveDate};

use crate::date_util::Granularity;
use crate::error::{Error, Result};

/// Provisional window start used for `ALL` before any data has been seen.
pub const EPOCH: NaiveDate = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();

/// A symbolic lookback window for summaries.
///
/// Each timeframe fixes both how far back to fetch and how coarse the
/// buckets are: `1W`/`1M` bucket by day, `3M` by week, `6M`/`1Y`/`ALL`
/// by month. `ALL` has no fixed lookback; its window is driven by the
/// earliest recorded observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    All,
}

impl Timeframe {
    /// Parse a timeframe symbol. Matching is ASCII case-insensitive
    /// (the mobile client sends `All`). Anything outside the closed set
    /// is a hard error, never a silent default.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1W" => Ok(Timeframe::OneWeek),
            "1M" => Ok(Timeframe::OneMonth),
            "3M" => Ok(Timeframe::ThreeMonths),
            "6M" => Ok(Timeframe::SixMonths),
            "1Y" => Ok(Timeframe::OneYear),
            "ALL" => Ok(Timeframe::All),
            _ => Err(Error::UnsupportedTimeframe(s.to_string())),
        }
    }

    /// Canonical symbol for display and logging.
    pub fn to_key(&self) -> &'static str {
        match self {
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
            Timeframe::ThreeMonths => "3M",
            Timeframe::SixMonths => "6M",
            Timeframe::OneYear => "1Y",
            Timeframe::All => "ALL",
        }
    }

    /// Bucket granularity for this timeframe.
    pub fn granularity(&self) -> Granularity {
        match self {
            Timeframe::OneWeek | Timeframe::OneMonth => Granularity::Day,
            Timeframe::ThreeMonths => Granularity::Week,
            Timeframe::SixMonths | Timeframe::OneYear | Timeframe::All => Granularity::Month,
        }
    }

    /// Raw (pre-alignment) window start: `now - lookback`.
    /// `None` for `ALL`, whose window comes from the data.
    pub fn raw_start(&self, now: NaiveDate) -> Option<NaiveDate> {
        match self {
            Timeframe::OneWeek => Some(now - Duration::days(7)),
            Timeframe::OneMonth => Some(now - Duration::days(28)),
            Timeframe::ThreeMonths => Some(now - Duration::days(91)),
            Timeframe::SixMonths => Some(now - Months::new(6)),
            Timeframe::OneYear => Some(now - Months::new(12)),
            Timeframe::All => None,
        }
    }

    /// Window start snapped toward the nearest granularity boundary.
    ///
    /// The boundary containing `raw_start` usually precedes it; in that
    /// case the boundary is advanced by a single day (not a full unit)
    /// so the earliest in-window day is never dropped. `None` for `ALL`.
    pub fn aligned_start(&self, now: NaiveDate) -> Option<NaiveDate> {
        self.raw_start(now)
            .map(|raw| align_to_boundary(raw, self.granularity()))
    }

    /// Fallback window start for `ALL` when no observations exist.
    pub fn all_fallback_start(now: NaiveDate) -> NaiveDate {
        now - Months::new(12)
    }
}

/// Snap `raw` toward the start of its containing granularity unit,
/// nudging forward one day when the boundary would precede `raw`.
pub fn align_to_boundary(raw: NaiveDate, granularity: Granularity) -> NaiveDate {
    let boundary = granularity.start_of(raw);
    if boundary < raw {
        boundary + Duration::days(1)
    } else {
        boundary
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_key())
    }
}
