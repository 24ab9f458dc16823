use crate::models::capacity::CapacityWarning;
use crate::models::interval::TimeRange;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// The one definition of "active". Overlap, capacity and spam checks all
    /// filter on this predicate; keep them from drifting apart.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Convert from string (for SQLx row mapping)
impl From<String> for AppointmentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "confirmed" => AppointmentStatus::Confirmed,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Pending,
        }
    }
}

/// A booked appointment. Amounts are minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    pub staff_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

/// Price and duration snapshot per booked service. Immutable after creation;
/// reschedule re-derives the appointment length from these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetail {
    pub id: String,
    pub appointment_id: String,
    pub service_id: String,
    pub price: i64,
    pub duration_minutes: i64,
}

impl AppointmentDetail {
    pub fn new(appointment_id: &str, service_id: &str, price: i64, duration_minutes: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            appointment_id: appointment_id.to_string(),
            service_id: service_id.to_string(),
            price,
            duration_minutes,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub staff_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub service_ids: Vec<String>,
    pub coupon_code: Option<String>,
    /// Required when an admin or stylist books on behalf of a customer.
    pub client_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleRequest {
    pub new_start: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

/// A created booking plus the advisory capacity warning, if any.
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub appointment: Appointment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<CapacityWarning>,
}

/// Revenue recognized when an appointment completes. Mirrors the event sent
/// to the reporting sink.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueInfo {
    pub appointment_id: String,
    pub client_id: String,
    pub staff_id: String,
    pub amount: i64,
    pub recognized_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatusResponse {
    pub appointment: Appointment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<RevenueInfo>,
}
