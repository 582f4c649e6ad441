pub mod date_util;
pub mod error;
pub mod storage;
pub mod summary;

pub use date_util::Granularity;
pub use error::{Error, Result};
pub use storage::repository::Metric;
pub use storage::Database;
pub use summary::{BucketResult, Formula, Observation, Timeframe};

use chrono::NaiveDate;

use storage::repository;

/// Main entry point for the metric warehouse.
///
/// Owns the storage handle; the aggregation engine itself is pure and
/// lives in [`summary`]. Every operation here is an independent call —
/// no state is shared between invocations beyond the database.
pub struct Metricdw {
    db: Database,
}

impl Metricdw {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    // ── Metric definitions ─────────────────────────────────────────

    pub async fn create_metric(&self, name: &str, metric_type: &str) -> Result<Metric> {
        let name = name.to_string();
        let metric_type = metric_type.to_string();
        let id = self
            .db
            .writer()
            .call(move |conn| repository::create_metric(conn, &name, &metric_type))
            .await?;
        self.get_metric(id).await
    }

    pub async fn get_metric(&self, metric_id: i64) -> Result<Metric> {
        self.db
            .reader()
            .call(move |conn| repository::get_metric(conn, metric_id))
            .await?
            .ok_or(Error::NotFound(metric_id))
    }

    pub async fn list_metrics(&self) -> Result<Vec<Metric>> {
        self.db
            .reader()
            .call(|conn| repository::list_metrics(conn))
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub async fn update_metric(
        &self,
        metric_id: i64,
        name: Option<&str>,
        metric_type: Option<&str>,
    ) -> Result<()> {
        let name = name.map(|s| s.to_string());
        let metric_type = metric_type.map(|s| s.to_string());
        let changed = self
            .db
            .writer()
            .call(move |conn| {
                repository::update_metric(conn, metric_id, name.as_deref(), metric_type.as_deref())
            })
            .await?;
        if changed {
            Ok(())
        } else {
            Err(Error::NotFound(metric_id))
        }
    }

    /// Delete a metric and all of its data points.
    pub async fn remove_metric(&self, metric_id: i64) -> Result<()> {
        let changed = self
            .db
            .writer()
            .call(move |conn| repository::delete_metric(conn, metric_id))
            .await?;
        if changed {
            Ok(())
        } else {
            Err(Error::NotFound(metric_id))
        }
    }

    // ── Data points ────────────────────────────────────────────────

    /// Record a value for a metric on a day (default: today). One value
    /// per day; logging twice overwrites. Returns the day key used.
    pub async fn log_value(
        &self,
        metric_id: i64,
        value: f64,
        date: Option<NaiveDate>,
    ) -> Result<NaiveDate> {
        self.get_metric(metric_id).await?;
        let day = date.unwrap_or_else(|| chrono::Local::now().date_naive());
        self.db
            .writer()
            .call(move |conn| repository::upsert_data_point(conn, metric_id, day, value))
            .await?;
        log::info!("logged {value} for metric {metric_id} on {day}");
        Ok(day)
    }

    /// All observations for a metric with `start <= date <= end`,
    /// ascending by date.
    pub async fn range(
        &self,
        metric_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>> {
        self.db
            .reader()
            .call(move |conn| repository::fetch_range(conn, metric_id, start, end))
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Time-bucketed, formula-aggregated summary of a metric.
    ///
    /// Request validation happens first: a bad timeframe or formula
    /// string fails here before any data is touched. The window is then
    /// resolved (for `ALL`, from the data itself), observations are
    /// fetched once, and the pure engine does the rest.
    pub async fn summary(
        &self,
        metric_id: i64,
        timeframe: &str,
        formula: &str,
    ) -> Result<Vec<BucketResult>> {
        let timeframe = Timeframe::parse(timeframe)?;
        let formula = Formula::parse(formula)?;
        self.get_metric(metric_id).await?;

        let now = chrono::Local::now().date_naive();
        let granularity = timeframe.granularity();

        let (aligned_start, observations) = match timeframe.aligned_start(now) {
            Some(start) => (start, self.range(metric_id, start, now).await?),
            None => {
                // ALL: provisional open-ended fetch, then let the data
                // pick the window. No data at all means a 12-month view.
                let observations = self
                    .range(metric_id, summary::timeframe::EPOCH, now)
                    .await?;
                let start = match observations.first() {
                    Some(first) => date_util::start_of_month(first.date),
                    None => Timeframe::all_fallback_start(now),
                };
                (start, observations)
            }
        };

        log::debug!(
            "summary metric={metric_id} timeframe={timeframe} formula={formula} \
             window={aligned_start}..{now}"
        );
        Ok(summary::summarize(
            aligned_start,
            granularity,
            now,
            &observations,
            &formula,
        ))
    }
}
