//! Mutex-guarded in-memory repositories. These back the unit and integration
//! tests, and `InMemoryCouponRepository` doubles as the small-deployment
//! coupon store (a keyed map behind a lock, nothing reflective about it).

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::models::{
    Appointment, AppointmentDetail, AppointmentStatus, Coupon, SalonSettings, Service, StaffMember,
    TimeRange,
};
use crate::repository::{
    AppointmentRepository, CouponRepository, ServiceCatalog, SettingsRepository, StaffRepository,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    inner: Mutex<AppointmentStore>,
}

#[derive(Default)]
struct AppointmentStore {
    appointments: Vec<Appointment>,
    details: HashMap<String, Vec<AppointmentDetail>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn insert_booking(
        &self,
        appointment: &Appointment,
        details: &[AppointmentDetail],
    ) -> ApiResult<()> {
        let mut store = self.inner.lock().await;

        // Same recheck the SQL implementation runs inside its transaction:
        // holding the lock makes check-and-insert one unit of work.
        let range = appointment.range();
        for existing in store
            .appointments
            .iter()
            .filter(|a| a.staff_id == appointment.staff_id && a.status.is_active())
        {
            if existing.start_time == appointment.start_time {
                return Err(ApiError::unprocessable(
                    "Staff member already booked at this start time",
                    json!({ "reason": "duplicate_booking" }),
                ));
            }
            if existing.range().overlaps(&range) {
                return Err(ApiError::unprocessable(
                    "Schedule conflict detected at persist time",
                    json!({
                        "staff_id": appointment.staff_id,
                        "conflicting_appointment_id": existing.id,
                    }),
                ));
            }
        }

        store.appointments.push(appointment.clone());
        store
            .details
            .insert(appointment.id.clone(), details.to_vec());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> ApiResult<Option<Appointment>> {
        let store = self.inner.lock().await;
        Ok(store.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn details_for(&self, appointment_id: &str) -> ApiResult<Vec<AppointmentDetail>> {
        let store = self.inner.lock().await;
        Ok(store
            .details
            .get(appointment_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_schedule(
        &self,
        id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> ApiResult<()> {
        let mut store = self.inner.lock().await;
        let idx = store
            .appointments
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("Appointment {} not found", id)))?;
        let staff_id = store.appointments[idx].staff_id.clone();

        // Same lock-held recheck as insert_booking before the interval moves.
        let range = TimeRange::new(start_time, end_time);
        if let Some(conflict_id) = store
            .appointments
            .iter()
            .find(|a| {
                a.id != id
                    && a.staff_id == staff_id
                    && a.status.is_active()
                    && a.range().overlaps(&range)
            })
            .map(|a| a.id.clone())
        {
            return Err(ApiError::unprocessable(
                "Schedule conflict detected at persist time",
                json!({
                    "staff_id": staff_id,
                    "conflicting_appointment_id": conflict_id,
                }),
            ));
        }

        let appointment = &mut store.appointments[idx];
        appointment.start_time = start_time;
        appointment.end_time = end_time;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: AppointmentStatus) -> ApiResult<()> {
        let mut store = self.inner.lock().await;
        let appointment = store
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("Appointment {} not found", id)))?;
        appointment.status = status;
        Ok(())
    }

    async fn active_for_staff(
        &self,
        staff_id: &str,
        exclude_id: Option<&str>,
    ) -> ApiResult<Vec<Appointment>> {
        let store = self.inner.lock().await;
        Ok(store
            .appointments
            .iter()
            .filter(|a| {
                a.staff_id == staff_id
                    && a.status.is_active()
                    && exclude_id.map_or(true, |ex| a.id != ex)
            })
            .cloned()
            .collect())
    }

    async fn active_on_day(&self, date: NaiveDate) -> ApiResult<Vec<Appointment>> {
        let store = self.inner.lock().await;
        Ok(store
            .appointments
            .iter()
            .filter(|a| a.status.is_active() && a.start_time.date_naive() == date)
            .cloned()
            .collect())
    }

    async fn active_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResult<Vec<Appointment>> {
        let window = TimeRange::new(start, end);
        let store = self.inner.lock().await;
        Ok(store
            .appointments
            .iter()
            .filter(|a| a.status.is_active() && a.range().overlaps(&window))
            .cloned()
            .collect())
    }

    async fn active_count_for_client(&self, client_id: &str) -> ApiResult<i64> {
        let store = self.inner.lock().await;
        Ok(store
            .appointments
            .iter()
            .filter(|a| a.client_id == client_id && a.status.is_active())
            .count() as i64)
    }

    async fn last_created_at(&self, client_id: &str) -> ApiResult<Option<DateTime<Utc>>> {
        let store = self.inner.lock().await;
        Ok(store
            .appointments
            .iter()
            .filter(|a| a.client_id == client_id)
            .map(|a| a.created_at)
            .max())
    }

    async fn created_count_between(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ApiResult<i64> {
        let store = self.inner.lock().await;
        Ok(store
            .appointments
            .iter()
            .filter(|a| a.client_id == client_id && a.created_at >= from && a.created_at < to)
            .count() as i64)
    }

    async fn duplicate_exists(
        &self,
        client_id: &str,
        staff_id: &str,
        start_time: DateTime<Utc>,
    ) -> ApiResult<bool> {
        let store = self.inner.lock().await;
        Ok(store.appointments.iter().any(|a| {
            a.client_id == client_id
                && a.staff_id == staff_id
                && a.start_time == start_time
                && a.status.is_active()
        }))
    }
}

#[derive(Default)]
pub struct InMemoryServiceCatalog {
    services: Mutex<Vec<Service>>,
}

impl InMemoryServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, service: Service) {
        self.services.lock().await.push(service);
    }
}

#[async_trait::async_trait]
impl ServiceCatalog for InMemoryServiceCatalog {
    async fn find_services(&self, ids: &[String]) -> ApiResult<Vec<Service>> {
        let services = self.services.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                services
                    .iter()
                    .find(|s| &s.id == id && s.active)
                    .cloned()
            })
            .collect())
    }

    async fn list_services(&self) -> ApiResult<Vec<Service>> {
        Ok(self.services.lock().await.clone())
    }
}

#[derive(Default)]
pub struct InMemoryStaffRepository {
    staff: Mutex<Vec<StaffMember>>,
}

impl InMemoryStaffRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, member: StaffMember) {
        self.staff.lock().await.push(member);
    }
}

#[async_trait::async_trait]
impl StaffRepository for InMemoryStaffRepository {
    async fn find_by_id(&self, id: &str) -> ApiResult<Option<StaffMember>> {
        let staff = self.staff.lock().await;
        Ok(staff.iter().find(|s| s.id == id).cloned())
    }

    async fn list_bookable(&self) -> ApiResult<Vec<StaffMember>> {
        let staff = self.staff.lock().await;
        let mut bookable: Vec<StaffMember> =
            staff.iter().filter(|s| s.is_bookable()).cloned().collect();
        bookable.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(bookable)
    }
}

/// Coupon catalog as a keyed map behind a mutex.
#[derive(Default)]
pub struct InMemoryCouponRepository {
    coupons: Mutex<HashMap<String, Coupon>>,
}

impl InMemoryCouponRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CouponRepository for InMemoryCouponRepository {
    async fn find_by_code(&self, code: &str) -> ApiResult<Option<Coupon>> {
        let coupons = self.coupons.lock().await;
        Ok(coupons.get(&Coupon::normalize_code(code)).cloned())
    }

    async fn create(&self, coupon: &Coupon) -> ApiResult<()> {
        let mut coupons = self.coupons.lock().await;
        let code = Coupon::normalize_code(&coupon.code);
        if coupons.contains_key(&code) {
            return Err(ApiError::BadRequest(format!(
                "Coupon {} already exists",
                code
            )));
        }
        let mut stored = coupon.clone();
        stored.code = code.clone();
        coupons.insert(code, stored);
        Ok(())
    }

    async fn update(&self, coupon: &Coupon) -> ApiResult<()> {
        let mut coupons = self.coupons.lock().await;
        let code = Coupon::normalize_code(&coupon.code);
        if !coupons.contains_key(&code) {
            return Err(ApiError::NotFound(format!("Coupon {} not found", code)));
        }
        let mut stored = coupon.clone();
        stored.code = code.clone();
        coupons.insert(code, stored);
        Ok(())
    }

    async fn delete(&self, code: &str) -> ApiResult<bool> {
        let mut coupons = self.coupons.lock().await;
        Ok(coupons.remove(&Coupon::normalize_code(code)).is_some())
    }

    async fn list_all(&self, include_expired: bool) -> ApiResult<Vec<Coupon>> {
        let now = Utc::now();
        let coupons = self.coupons.lock().await;
        let mut all: Vec<Coupon> = coupons
            .values()
            .filter(|c| include_expired || !c.is_expired(now))
            .cloned()
            .collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(all)
    }
}

pub struct InMemorySettingsRepository {
    settings: Mutex<SalonSettings>,
}

impl InMemorySettingsRepository {
    pub fn new(settings: SalonSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl Default for InMemorySettingsRepository {
    fn default() -> Self {
        Self::new(SalonSettings::default())
    }
}

#[async_trait::async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load(&self) -> ApiResult<SalonSettings> {
        Ok(self.settings.lock().await.clone())
    }

    async fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        use crate::models::settings::keys;

        let mut settings = self.settings.lock().await;
        let invalid = || ApiError::BadRequest(format!("Invalid value for {}: {}", key, value));
        match key {
            keys::MAX_CONCURRENT_APPOINTMENTS => {
                settings.max_concurrent_appointments = value.parse().map_err(|_| invalid())?;
            }
            keys::MAX_DAILY_APPOINTMENTS => {
                settings.max_daily_appointments = value.parse().map_err(|_| invalid())?;
            }
            keys::WORKING_HOURS_START => {
                settings.working_hours_start =
                    SalonSettings::parse_time(value).ok_or_else(invalid)?;
            }
            keys::WORKING_HOURS_END => {
                settings.working_hours_end =
                    SalonSettings::parse_time(value).ok_or_else(invalid)?;
            }
            keys::CAPACITY_WARNING_THRESHOLD => {
                settings.capacity_warning_threshold = value.parse().map_err(|_| invalid())?;
            }
            keys::ENABLE_CAPACITY_CHECK => {
                settings.enable_capacity_check = value.parse().map_err(|_| invalid())?;
            }
            _ => return Err(ApiError::BadRequest(format!("Unknown setting: {}", key))),
        }
        Ok(())
    }
}
