use crate::api::middleware::error::{ApiError, ApiResult};
use crate::repository::AppointmentRepository;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;

/// A client may hold at most this many active appointments.
pub const MAX_ACTIVE_APPOINTMENTS: i64 = 3;
/// Minimum spacing between two booking creations by the same client.
pub const CREATION_COOLDOWN_SECONDS: i64 = 5;
/// Maximum booking creations per client per calendar day.
pub const MAX_DAILY_CREATIONS: i64 = 5;

/// Per-client rate limiting and duplicate-booking prevention, evaluated
/// against persisted appointment data before any booking mutation.
#[derive(Clone)]
pub struct SpamGuard {
    appointments: Arc<dyn AppointmentRepository>,
}

impl SpamGuard {
    pub fn new(appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointments }
    }

    /// `staff_id` is None when the request leaves staff selection to the
    /// assigner; the duplicate check then falls to the persist-time unique
    /// index instead.
    pub async fn check(
        &self,
        client_id: &str,
        staff_id: Option<&str>,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ApiResult<()> {
        let active = self.appointments.active_count_for_client(client_id).await?;
        if active >= MAX_ACTIVE_APPOINTMENTS {
            return Err(ApiError::rate_limited(
                format!(
                    "Client already holds {} active appointments (limit {})",
                    active, MAX_ACTIVE_APPOINTMENTS
                ),
                None,
            ));
        }

        if let Some(last) = self.appointments.last_created_at(client_id).await? {
            let elapsed = (now - last).num_seconds();
            if elapsed < CREATION_COOLDOWN_SECONDS {
                let retry_after = (CREATION_COOLDOWN_SECONDS - elapsed).max(1) as u64;
                return Err(ApiError::rate_limited(
                    "Bookings are being created too quickly",
                    Some(retry_after),
                ));
            }
        }

        let day_start = Utc
            .from_utc_datetime(&now.date_naive().and_hms_opt(0, 0, 0).unwrap());
        let day_end = day_start + Duration::days(1);
        let created_today = self
            .appointments
            .created_count_between(client_id, day_start, day_end)
            .await?;
        if created_today >= MAX_DAILY_CREATIONS {
            return Err(ApiError::rate_limited(
                format!(
                    "Daily booking limit of {} reached for this client",
                    MAX_DAILY_CREATIONS
                ),
                None,
            ));
        }

        if let Some(staff_id) = staff_id {
            if self
                .appointments
                .duplicate_exists(client_id, staff_id, start_time)
                .await?
            {
                return Err(ApiError::unprocessable(
                    "An identical booking already exists for this staff and start time",
                    json!({
                        "reason": "duplicate_booking",
                        "staff_id": staff_id,
                        "start_time": start_time,
                    }),
                ));
            }
        }

        Ok(())
    }
}
