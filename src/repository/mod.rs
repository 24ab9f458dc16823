pub mod memory;

use crate::api::middleware::error::ApiResult;
use crate::models::{
    Appointment, AppointmentDetail, AppointmentStatus, Coupon, SalonSettings, Service, StaffMember,
};
use chrono::{DateTime, NaiveDate, Utc};

/// Persistence port for appointments. "Active" everywhere below means
/// `AppointmentStatus::is_active`; implementations must filter on the same
/// predicate the services reason about.
#[async_trait::async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Persist an appointment together with its detail rows in one unit of
    /// work. Implementations must re-verify inside the same transaction that
    /// no active appointment for the staff member overlaps the new interval,
    /// and roll everything back on any failure.
    async fn insert_booking(
        &self,
        appointment: &Appointment,
        details: &[AppointmentDetail],
    ) -> ApiResult<()>;

    async fn find_by_id(&self, id: &str) -> ApiResult<Option<Appointment>>;

    async fn details_for(&self, appointment_id: &str) -> ApiResult<Vec<AppointmentDetail>>;

    /// Move an appointment to a new interval. Like `insert_booking`, the
    /// staff-overlap recheck and the write happen in one unit of work; the
    /// appointment's own old interval never counts as a conflict.
    async fn update_schedule(
        &self,
        id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> ApiResult<()>;

    async fn update_status(&self, id: &str, status: AppointmentStatus) -> ApiResult<()>;

    /// Active appointments for one staff member, optionally excluding one
    /// appointment id (used when rescheduling).
    async fn active_for_staff(
        &self,
        staff_id: &str,
        exclude_id: Option<&str>,
    ) -> ApiResult<Vec<Appointment>>;

    /// Active appointments starting on `date`.
    async fn active_on_day(&self, date: NaiveDate) -> ApiResult<Vec<Appointment>>;

    /// Active appointments whose `[start, end)` interval overlaps the given
    /// half-open window.
    async fn active_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResult<Vec<Appointment>>;

    async fn active_count_for_client(&self, client_id: &str) -> ApiResult<i64>;

    /// Creation time of the client's most recent appointment, any status.
    async fn last_created_at(&self, client_id: &str) -> ApiResult<Option<DateTime<Utc>>>;

    /// Appointments the client created within `[from, to)`, any status.
    async fn created_count_between(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ApiResult<i64>;

    /// Whether the client already holds an active appointment with this staff
    /// member at exactly this start time (duplicate submission).
    async fn duplicate_exists(
        &self,
        client_id: &str,
        staff_id: &str,
        start_time: DateTime<Utc>,
    ) -> ApiResult<bool>;
}

/// Read-only view of the service catalog maintained by the product CRUD.
#[async_trait::async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Resolve the requested service ids. Unknown or inactive ids are an
    /// error for the caller to surface.
    async fn find_services(&self, ids: &[String]) -> ApiResult<Vec<Service>>;

    async fn list_services(&self) -> ApiResult<Vec<Service>>;
}

#[async_trait::async_trait]
pub trait StaffRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> ApiResult<Option<StaffMember>>;

    /// Active staff eligible for bookings, ordered by ascending id so
    /// auto-assignment stays deterministic.
    async fn list_bookable(&self) -> ApiResult<Vec<StaffMember>>;
}

/// Keyed coupon catalog. Replaces the original global, file-backed store with
/// an injected abstraction exposing an explicit listing of expired coupons.
#[async_trait::async_trait]
pub trait CouponRepository: Send + Sync {
    /// Lookup by normalized (uppercased, trimmed) code.
    async fn find_by_code(&self, code: &str) -> ApiResult<Option<Coupon>>;

    async fn create(&self, coupon: &Coupon) -> ApiResult<()>;

    async fn update(&self, coupon: &Coupon) -> ApiResult<()>;

    async fn delete(&self, code: &str) -> ApiResult<bool>;

    async fn list_all(&self, include_expired: bool) -> ApiResult<Vec<Coupon>>;
}

#[async_trait::async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Current salon configuration, with defaults for unset keys.
    async fn load(&self) -> ApiResult<SalonSettings>;

    async fn set(&self, key: &str, value: &str) -> ApiResult<()>;
}
