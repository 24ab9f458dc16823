use crate::models::interval::TimeRange;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Slot granularity used by availability scans and the capacity dashboard.
pub const SLOT_MINUTES: i64 = 30;

pub mod keys {
    pub const MAX_CONCURRENT_APPOINTMENTS: &str = "max_concurrent_appointments";
    pub const MAX_DAILY_APPOINTMENTS: &str = "max_daily_appointments";
    pub const WORKING_HOURS_START: &str = "working_hours_start";
    pub const WORKING_HOURS_END: &str = "working_hours_end";
    pub const CAPACITY_WARNING_THRESHOLD: &str = "capacity_warning_threshold";
    pub const ENABLE_CAPACITY_CHECK: &str = "enable_capacity_check";
}

/// Typed view over the salon's key-value configuration store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalonSettings {
    pub max_concurrent_appointments: i64,
    pub max_daily_appointments: i64,
    pub working_hours_start: NaiveTime,
    pub working_hours_end: NaiveTime,
    /// Percent of concurrent capacity at which bookings start carrying an
    /// advisory warning.
    pub capacity_warning_threshold: i64,
    pub enable_capacity_check: bool,
}

impl Default for SalonSettings {
    fn default() -> Self {
        Self {
            max_concurrent_appointments: 5,
            max_daily_appointments: 30,
            working_hours_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            working_hours_end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            capacity_warning_threshold: 80,
            enable_capacity_check: true,
        }
    }
}

impl SalonSettings {
    /// The working window of `date` as a UTC time range.
    pub fn working_range(&self, date: NaiveDate) -> TimeRange {
        let start = Utc.from_utc_datetime(&date.and_time(self.working_hours_start));
        let end = Utc.from_utc_datetime(&date.and_time(self.working_hours_end));
        TimeRange::new(start, end)
    }

    /// Candidate slot start times across the working window, at fixed
    /// 30-minute increments.
    pub fn slot_starts(&self, date: NaiveDate) -> Vec<chrono::DateTime<Utc>> {
        let window = self.working_range(date);
        let mut starts = Vec::new();
        let mut cursor = window.start;
        while cursor < window.end {
            starts.push(cursor);
            cursor += chrono::Duration::minutes(SLOT_MINUTES);
        }
        starts
    }

    pub fn parse_time(value: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(value, "%H:%M").ok()
    }
}
