use crate::api::middleware::error::{ApiError, ApiResult};
use crate::models::settings::SLOT_MINUTES;
use crate::models::{
    CapacityDashboard, CapacityWarning, SalonSettings, SlotInfo, SlotListResponse, TimeRange,
};
use crate::repository::{AppointmentRepository, SettingsRepository};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use std::sync::Arc;

/// Salon-wide daily and concurrent capacity limits, sourced from the settings
/// store. Entirely bypassed when `enable_capacity_check` is off.
#[derive(Clone)]
pub struct CapacityGuard {
    appointments: Arc<dyn AppointmentRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl CapacityGuard {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            appointments,
            settings,
        }
    }

    /// Rejects when the day already carries `max_daily_appointments` active
    /// bookings. The error carries the counts and a suggested next free slot.
    pub async fn check_daily(&self, date: NaiveDate) -> ApiResult<()> {
        let settings = self.settings.load().await?;
        if !settings.enable_capacity_check {
            return Ok(());
        }

        let count = self.appointments.active_on_day(date).await?.len() as i64;
        if count >= settings.max_daily_appointments {
            let suggestion = self.find_next_available_slot(date).await?;
            return Err(ApiError::unprocessable(
                "Daily appointment capacity reached",
                json!({
                    "reason": "daily_capacity_exceeded",
                    "date": date,
                    "current": count,
                    "limit": settings.max_daily_appointments,
                    "next_available_slot": suggestion,
                }),
            ));
        }
        Ok(())
    }

    /// Rejects when `max_concurrent_appointments` active bookings already
    /// overlap the window. On success, returns an advisory warning once the
    /// projected load reaches the configured threshold percentage.
    pub async fn check_concurrent(&self, range: &TimeRange) -> ApiResult<Option<CapacityWarning>> {
        let settings = self.settings.load().await?;
        if !settings.enable_capacity_check {
            return Ok(None);
        }

        let count = self
            .appointments
            .active_overlapping(range.start, range.end)
            .await?
            .len() as i64;
        let limit = settings.max_concurrent_appointments;

        if count >= limit {
            let suggestion = self
                .find_next_available_slot(range.start.date_naive())
                .await?;
            return Err(ApiError::unprocessable(
                "Concurrent appointment capacity reached",
                json!({
                    "reason": "concurrent_capacity_exceeded",
                    "current": count,
                    "limit": limit,
                    "next_available_slot": suggestion,
                }),
            ));
        }

        let projected = count + 1;
        let percent = if limit > 0 { projected * 100 / limit } else { 0 };
        if percent >= settings.capacity_warning_threshold {
            return Ok(Some(CapacityWarning {
                message: format!(
                    "Salon is at {}% of concurrent capacity for this time",
                    percent
                ),
                current: projected,
                limit,
                percent,
            }));
        }
        Ok(None)
    }

    /// First 30-minute slot of the day whose concurrent load is below the
    /// limit, or None when the day is full.
    pub async fn find_next_available_slot(
        &self,
        date: NaiveDate,
    ) -> ApiResult<Option<DateTime<Utc>>> {
        let settings = self.settings.load().await?;
        for start in settings.slot_starts(date) {
            let slot = TimeRange::from_duration(start, SLOT_MINUTES);
            let count = self
                .appointments
                .active_overlapping(slot.start, slot.end)
                .await?
                .len() as i64;
            if count < settings.max_concurrent_appointments {
                return Ok(Some(start));
            }
        }
        Ok(None)
    }

    /// Open slots able to hold a booking of `duration_minutes`, with their
    /// salon-wide concurrent counts.
    pub async fn open_slots(
        &self,
        date: NaiveDate,
        duration_minutes: i64,
    ) -> ApiResult<SlotListResponse> {
        let settings = self.settings.load().await?;
        let closing = settings.working_range(date).end;

        let mut slots = Vec::new();
        for start in settings.slot_starts(date) {
            let candidate = TimeRange::from_duration(start, duration_minutes);
            if candidate.end > closing {
                break;
            }
            let count = self
                .appointments
                .active_overlapping(candidate.start, candidate.end)
                .await?
                .len() as i64;
            if !settings.enable_capacity_check || count < settings.max_concurrent_appointments {
                slots.push(SlotInfo {
                    start: candidate.start,
                    end: candidate.end,
                    concurrent_count: count,
                    capacity_remaining: (settings.max_concurrent_appointments - count).max(0),
                });
            }
        }

        Ok(SlotListResponse {
            date,
            duration_minutes,
            slots,
        })
    }

    /// Settings, current load and recommendations for one day.
    pub async fn dashboard(&self, date: NaiveDate) -> ApiResult<CapacityDashboard> {
        let settings = self.settings.load().await?;
        let daily_count = self.appointments.active_on_day(date).await?.len() as i64;

        let mut peak_concurrent = 0i64;
        for start in settings.slot_starts(date) {
            let slot = TimeRange::from_duration(start, SLOT_MINUTES);
            let count = self
                .appointments
                .active_overlapping(slot.start, slot.end)
                .await?
                .len() as i64;
            peak_concurrent = peak_concurrent.max(count);
        }

        let daily_utilization_percent = if settings.max_daily_appointments > 0 {
            daily_count * 100 / settings.max_daily_appointments
        } else {
            0
        };

        let next_available_slot = self.find_next_available_slot(date).await?;

        let mut recommendations = Vec::new();
        if !settings.enable_capacity_check {
            recommendations.push("Capacity checks are disabled".to_string());
        }
        if daily_count >= settings.max_daily_appointments {
            recommendations.push("Day is fully booked; offer another date".to_string());
        } else if daily_utilization_percent >= settings.capacity_warning_threshold {
            recommendations
                .push("Approaching the daily limit; consider adding staff".to_string());
        }
        if peak_concurrent >= settings.max_concurrent_appointments {
            recommendations
                .push("Peak hours are at concurrent capacity; spread bookings out".to_string());
        }

        Ok(CapacityDashboard {
            date,
            capacity_check_enabled: settings.enable_capacity_check,
            max_daily_appointments: settings.max_daily_appointments,
            max_concurrent_appointments: settings.max_concurrent_appointments,
            capacity_warning_threshold: settings.capacity_warning_threshold,
            daily_count,
            daily_utilization_percent,
            peak_concurrent,
            next_available_slot,
            recommendations,
        })
    }

    pub async fn settings(&self) -> ApiResult<SalonSettings> {
        self.settings.load().await
    }
}
