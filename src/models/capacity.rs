use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Advisory notice attached to a successful booking when concurrent load is
/// at or past the configured warning threshold. Never aborts the booking.
#[derive(Debug, Clone, Serialize)]
pub struct CapacityWarning {
    pub message: String,
    pub current: i64,
    pub limit: i64,
    pub percent: i64,
}

/// An occupied interval for one staff member on a given day.
#[derive(Debug, Clone, Serialize)]
pub struct BusySlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub staff_id: String,
    pub date: NaiveDate,
    pub busy: Vec<BusySlot>,
    /// Share of 30-minute working-hour slots the staff member is free for.
    pub availability_percent: i64,
}

/// One candidate 30-minute start with its salon-wide concurrent load.
#[derive(Debug, Clone, Serialize)]
pub struct SlotInfo {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub concurrent_count: i64,
    pub capacity_remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotListResponse {
    pub date: NaiveDate,
    pub duration_minutes: i64,
    pub slots: Vec<SlotInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityDashboard {
    pub date: NaiveDate,
    pub capacity_check_enabled: bool,
    pub max_daily_appointments: i64,
    pub max_concurrent_appointments: i64,
    pub capacity_warning_threshold: i64,
    pub daily_count: i64,
    pub daily_utilization_percent: i64,
    pub peak_concurrent: i64,
    pub next_available_slot: Option<DateTime<Utc>>,
    pub recommendations: Vec<String>,
}
