mod appointments;
mod catalog;
mod coupons;
mod settings;

use crate::api::middleware::error::{ApiError, ApiResult};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Shared filter for the "active" statuses. Must stay in lockstep with
/// `AppointmentStatus::is_active`.
pub(crate) const ACTIVE_STATUS_SQL: &str = "status IN ('pending', 'confirmed')";

/// SQLite-backed store. Implements all repository ports; clone freely, the
/// pool is shared.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Timestamps are stored as fixed-width UTC ISO-8601 text
/// (`YYYY-MM-DDTHH:MM:SSZ`), so lexicographic comparison in SQL matches
/// chronological order.
pub(crate) fn fmt_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_ts(value: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::Internal(format!("Malformed timestamp {}: {}", value, e)))
}

/// `[midnight, next midnight)` of `date` in storage format.
pub(crate) fn day_bounds(date: NaiveDate) -> (String, String) {
    let start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let end = start + chrono::Duration::days(1);
    (fmt_ts(start), fmt_ts(end))
}
