use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::settings::keys;
use crate::models::SalonSettings;
use crate::repository::SettingsRepository;
use sqlx::Row;
use std::collections::HashMap;

fn validate(key: &str, value: &str) -> ApiResult<()> {
    let invalid = || ApiError::BadRequest(format!("Invalid value for {}: {}", key, value));
    match key {
        keys::MAX_CONCURRENT_APPOINTMENTS
        | keys::MAX_DAILY_APPOINTMENTS
        | keys::CAPACITY_WARNING_THRESHOLD => {
            value.parse::<i64>().map_err(|_| invalid())?;
        }
        keys::WORKING_HOURS_START | keys::WORKING_HOURS_END => {
            SalonSettings::parse_time(value).ok_or_else(invalid)?;
        }
        keys::ENABLE_CAPACITY_CHECK => {
            value.parse::<bool>().map_err(|_| invalid())?;
        }
        _ => return Err(ApiError::BadRequest(format!("Unknown setting: {}", key))),
    }
    Ok(())
}

#[async_trait::async_trait]
impl SettingsRepository for Database {
    async fn load(&self) -> ApiResult<SalonSettings> {
        let rows = sqlx::query("SELECT key, value FROM salon_settings")
            .fetch_all(self.pool())
            .await?;

        let mut stored = HashMap::new();
        for row in &rows {
            stored.insert(
                row.try_get::<String, _>("key")?,
                row.try_get::<String, _>("value")?,
            );
        }

        // Missing or unparseable keys fall back to the defaults.
        let mut settings = SalonSettings::default();
        if let Some(v) = stored.get(keys::MAX_CONCURRENT_APPOINTMENTS) {
            if let Ok(n) = v.parse() {
                settings.max_concurrent_appointments = n;
            }
        }
        if let Some(v) = stored.get(keys::MAX_DAILY_APPOINTMENTS) {
            if let Ok(n) = v.parse() {
                settings.max_daily_appointments = n;
            }
        }
        if let Some(t) = stored
            .get(keys::WORKING_HOURS_START)
            .and_then(|v| SalonSettings::parse_time(v))
        {
            settings.working_hours_start = t;
        }
        if let Some(t) = stored
            .get(keys::WORKING_HOURS_END)
            .and_then(|v| SalonSettings::parse_time(v))
        {
            settings.working_hours_end = t;
        }
        if let Some(v) = stored.get(keys::CAPACITY_WARNING_THRESHOLD) {
            if let Ok(n) = v.parse() {
                settings.capacity_warning_threshold = n;
            }
        }
        if let Some(v) = stored.get(keys::ENABLE_CAPACITY_CHECK) {
            if let Ok(b) = v.parse() {
                settings.enable_capacity_check = b;
            }
        }
        Ok(settings)
    }

    async fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        validate(key, value)?;
        sqlx::query(
            "INSERT INTO salon_settings (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}
