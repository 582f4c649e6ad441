use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::summary::Observation;

/// A metric definition row.
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub metric_id: i64,
    pub name: String,
    pub metric_type: String,
    pub created_at: String,
}

const DATE_FMT: &str = "%Y-%m-%d";

fn date_from_key(key: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(key, DATE_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

// ── Metrics ────────────────────────────────────────────────────────

pub fn create_metric(
    conn: &Connection,
    name: &str,
    metric_type: &str,
) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO metrics (name, metric_type) VALUES (?1, ?2)",
        params![name, metric_type],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_metric(conn: &Connection, metric_id: i64) -> Result<Option<Metric>, rusqlite::Error> {
    conn.query_row(
        "SELECT metric_id, name, metric_type, created_at FROM metrics WHERE metric_id = ?1",
        params![metric_id],
        |row| {
            Ok(Metric {
                metric_id: row.get(0)?,
                name: row.get(1)?,
                metric_type: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    )
    .optional()
}

pub fn list_metrics(conn: &Connection) -> Result<Vec<Metric>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT metric_id, name, metric_type, created_at FROM metrics ORDER BY metric_id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Metric {
            metric_id: row.get(0)?,
            name: row.get(1)?,
            metric_type: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?;
    rows.collect()
}

/// Update name and/or type. Returns false if the metric doesn't exist.
pub fn update_metric(
    conn: &Connection,
    metric_id: i64,
    name: Option<&str>,
    metric_type: Option<&str>,
) -> Result<bool, rusqlite::Error> {
    let changed = conn.execute(
        "UPDATE metrics SET
            name = COALESCE(?2, name),
            metric_type = COALESCE(?3, metric_type)
         WHERE metric_id = ?1",
        params![metric_id, name, metric_type],
    )?;
    Ok(changed > 0)
}

/// Delete a metric; its data points cascade. Returns false if absent.
pub fn delete_metric(conn: &Connection, metric_id: i64) -> Result<bool, rusqlite::Error> {
    let changed = conn.execute(
        "DELETE FROM metrics WHERE metric_id = ?1",
        params![metric_id],
    )?;
    Ok(changed > 0)
}

// ── Data points ────────────────────────────────────────────────────

/// Store one value for (metric, day). A second call for the same day
/// overwrites — last write wins.
pub fn upsert_data_point(
    conn: &Connection,
    metric_id: i64,
    date: NaiveDate,
    value: f64,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO data_points (metric_id, date_key, value, recorded_at)
         VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(metric_id, date_key) DO UPDATE SET
            value = excluded.value,
            recorded_at = excluded.recorded_at",
        params![metric_id, date.format(DATE_FMT).to_string(), value],
    )?;
    Ok(())
}

/// All observations for a metric with `start <= date <= end`, ascending.
pub fn fetch_range(
    conn: &Connection,
    metric_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Observation>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT date_key, value FROM data_points
         WHERE metric_id = ?1 AND date_key >= ?2 AND date_key <= ?3
         ORDER BY date_key ASC",
    )?;
    let rows = stmt.query_map(
        params![
            metric_id,
            start.format(DATE_FMT).to_string(),
            end.format(DATE_FMT).to_string()
        ],
        |row| {
            let key: String = row.get(0)?;
            Ok(Observation {
                date: date_from_key(&key)?,
                value: row.get(1)?,
            })
        },
    )?;
    rows.collect()
}

pub fn data_point_count(conn: &Connection, metric_id: i64) -> Result<i64, rusqlite::Error> {
    conn.query_row(
        "SELECT COUNT(*) FROM data_points WHERE metric_id = ?1",
        params![metric_id],
        |row| row.get(0),
    )
}
