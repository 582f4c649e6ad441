use std::sync::LazyLock;

use regex::Regex;

use crate::date_util::Granularity;
use crate::error::{Error, Result};

static RE_COUNT_ABOVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>[0-9.]+$").unwrap());
static RE_PASS_RATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^%>[0-9.]+$").unwrap());

/// Reduction applied to each bucket's values.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// Arithmetic sum of the bucket's values.
    Sum,
    /// Arithmetic mean of the bucket's values.
    Avg,
    /// `>T`: count of values strictly greater than the threshold.
    CountAbove(f64),
    /// `%>T`: pass-rate against the threshold. For day buckets this is
    /// all-or-nothing (100 or 0); for week/month buckets it is the
    /// percentage of calendar days in the bucket that exceeded T.
    PassRate(f64),
}

impl Formula {
    /// Parse a formula string: `sum`, `avg`, `>T`, or `%>T`.
    /// Anything else is a hard error naming the input.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "sum" => return Ok(Formula::Sum),
            "avg" => return Ok(Formula::Avg),
            _ => {}
        }
        if RE_COUNT_ABOVE.is_match(s) {
            return Ok(Formula::CountAbove(parse_threshold(s)?));
        }
        if RE_PASS_RATE.is_match(s) {
            return Ok(Formula::PassRate(parse_threshold(s)?));
        }
        Err(Error::UnsupportedFormula(s.to_string()))
    }

    /// Reduce one bucket's values to a single output.
    ///
    /// `day_span` is the inclusive number of calendar days the bucket
    /// covers; it only matters for `%>T` at week/month granularity,
    /// where the denominator is the bucket's full span regardless of
    /// how many days actually have observations.
    ///
    /// An empty bucket reduces to `None` under every formula.
    pub fn reduce(
        &self,
        values: &[f64],
        granularity: Granularity,
        day_span: i64,
    ) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            Formula::Sum => Some(values.iter().sum()),
            Formula::Avg => Some(values.iter().sum::<f64>() / values.len() as f64),
            Formula::CountAbove(t) => {
                Some(values.iter().filter(|v| **v > *t).count() as f64)
            }
            Formula::PassRate(t) => {
                let passing = values.iter().filter(|v| **v > *t).count();
                match granularity {
                    Granularity::Day => Some(if passing > 0 { 100.0 } else { 0.0 }),
                    Granularity::Week | Granularity::Month => {
                        let pct = 100.0 * passing as f64 / day_span as f64;
                        Some((pct * 10.0).round() / 10.0)
                    }
                }
            }
        }
    }
}

/// Extract the numeric threshold from a `>T` / `%>T` formula string by
/// stripping everything that isn't a digit or a decimal point.
fn parse_threshold(s: &str) -> Result<f64> {
    let digits: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits
        .parse::<f64>()
        .map_err(|_| Error::UnsupportedFormula(s.to_string()))
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Sum => write!(f, "sum"),
            Formula::Avg => write!(f, "avg"),
            Formula::CountAbove(t) => write!(f, ">{t}"),
            Formula::PassRate(t) => write!(f, "%>{t}"),
        }
    }
}
