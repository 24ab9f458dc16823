use crate::api::middleware::error::{ApiError, ApiResult};
use crate::events::{EventBus, SystemEvent};
use crate::models::settings::SLOT_MINUTES;
use crate::models::{
    Actor, ActorRole, Appointment, AppointmentDetail, AppointmentStatus, AvailabilityResponse,
    BookingResponse, BusySlot, CapacityDashboard, CreateAppointmentRequest, RevenueInfo,
    SlotListResponse, TimeRange, UpdateStatusResponse,
};
use crate::repository::{AppointmentRepository, ServiceCatalog, StaffRepository};
use crate::services::capacity_guard::CapacityGuard;
use crate::services::conflict_detector::ConflictDetector;
use crate::services::coupon_engine::CouponEngine;
use crate::services::spam_guard::SpamGuard;
use crate::services::staff_assigner::StaffAssigner;
use crate::services::state_machine::validate_transition;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Fallback appointment length for reschedules when no detail rows exist.
const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Composes the guards, detectors and engines into the booking operations.
/// Every check fails fast; nothing writes after a failed check, and the final
/// persist is one transaction.
#[derive(Clone)]
pub struct BookingService {
    appointments: Arc<dyn AppointmentRepository>,
    catalog: Arc<dyn ServiceCatalog>,
    staff: Arc<dyn StaffRepository>,
    conflicts: ConflictDetector,
    capacity: CapacityGuard,
    assigner: StaffAssigner,
    coupons: CouponEngine,
    spam: SpamGuard,
    event_bus: EventBus,
}

impl BookingService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        catalog: Arc<dyn ServiceCatalog>,
        staff: Arc<dyn StaffRepository>,
        conflicts: ConflictDetector,
        capacity: CapacityGuard,
        assigner: StaffAssigner,
        coupons: CouponEngine,
        spam: SpamGuard,
        event_bus: EventBus,
    ) -> Self {
        Self {
            appointments,
            catalog,
            staff,
            conflicts,
            capacity,
            assigner,
            coupons,
            spam,
            event_bus,
        }
    }

    /// Create a booking: spam guard, duration/amount computation, staff
    /// resolution, conflict and capacity checks, coupon validation, then one
    /// atomic persist of the appointment and its details.
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateAppointmentRequest,
    ) -> ApiResult<BookingResponse> {
        let now = Utc::now();
        let client_id = self.resolve_client(actor, request.client_id.as_deref())?;

        if request.service_ids.is_empty() {
            return Err(ApiError::BadRequest(
                "At least one service must be selected".to_string(),
            ));
        }
        if request.start_time <= now {
            return Err(ApiError::BadRequest(
                "start_time must be in the future".to_string(),
            ));
        }

        self.spam
            .check(
                &client_id,
                request.staff_id.as_deref(),
                request.start_time,
                now,
            )
            .await?;

        let services = self.catalog.find_services(&request.service_ids).await?;
        let found: HashSet<&str> = services.iter().map(|s| s.id.as_str()).collect();
        if let Some(missing) = request
            .service_ids
            .iter()
            .find(|id| !found.contains(id.as_str()))
        {
            return Err(ApiError::NotFound(format!("Unknown service {}", missing)));
        }

        let total_duration: i64 = services.iter().map(|s| s.duration_minutes).sum();
        let total_amount: i64 = services.iter().map(|s| s.price).sum();
        let range = TimeRange::from_duration(request.start_time, total_duration);

        let staff = match &request.staff_id {
            Some(id) => {
                let member = self
                    .staff
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| ApiError::NotFound(format!("Unknown staff member {}", id)))?;
                if !member.is_bookable() {
                    return Err(ApiError::BadRequest(format!(
                        "Staff member {} is not accepting bookings",
                        id
                    )));
                }
                member
            }
            None => self.assigner.assign(&range).await?,
        };

        if self.conflicts.has_conflict(&staff.id, &range, None).await? {
            return Err(ApiError::unprocessable(
                "Requested time overlaps an existing appointment",
                json!({
                    "reason": "schedule_conflict",
                    "staff_id": staff.id,
                    "start": range.start,
                    "end": range.end,
                }),
            ));
        }

        self.capacity.check_daily(range.start.date_naive()).await?;
        let warning = self.capacity.check_concurrent(&range).await?;

        let (discount_amount, final_amount, coupon_code) = match request
            .coupon_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
        {
            Some(code) => {
                let quote = self
                    .coupons
                    .validate(code, total_amount, &client_id, now)
                    .await?;
                (quote.discount_amount, quote.final_amount, Some(quote.code))
            }
            None => (0, total_amount, None),
        };

        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            client_id,
            staff_id: staff.id.clone(),
            start_time: range.start,
            end_time: range.end,
            status: AppointmentStatus::Pending,
            total_amount,
            discount_amount,
            final_amount,
            coupon_code,
            notes: request.notes,
            created_at: now,
        };
        let details: Vec<AppointmentDetail> = services
            .iter()
            .map(|s| AppointmentDetail::new(&appointment.id, &s.id, s.price, s.duration_minutes))
            .collect();

        self.appointments
            .insert_booking(&appointment, &details)
            .await?;

        tracing::info!(
            "Booked appointment {} for client {} with staff {} ({} - {})",
            appointment.id,
            appointment.client_id,
            appointment.staff_id,
            appointment.start_time,
            appointment.end_time
        );

        Ok(BookingResponse {
            appointment,
            warning,
        })
    }

    /// Move a Pending appointment to a new start. Length comes from the
    /// stored detail snapshots; 60 minutes when there are none.
    pub async fn reschedule(
        &self,
        actor: &Actor,
        id: &str,
        new_start: DateTime<Utc>,
    ) -> ApiResult<Appointment> {
        let mut appointment = self.load_owned(actor, id).await?;

        if appointment.status != AppointmentStatus::Pending {
            return Err(ApiError::BadRequest(format!(
                "Only pending appointments can be rescheduled (status is {})",
                appointment.status
            )));
        }
        if new_start <= Utc::now() {
            return Err(ApiError::BadRequest(
                "new_start must be in the future".to_string(),
            ));
        }

        let details = self.appointments.details_for(id).await?;
        let duration: i64 = if details.is_empty() {
            DEFAULT_DURATION_MINUTES
        } else {
            details.iter().map(|d| d.duration_minutes).sum()
        };
        let range = TimeRange::from_duration(new_start, duration);

        if self
            .conflicts
            .has_conflict(&appointment.staff_id, &range, Some(id))
            .await?
        {
            return Err(ApiError::unprocessable(
                "New time overlaps an existing appointment",
                json!({
                    "reason": "schedule_conflict",
                    "staff_id": appointment.staff_id,
                    "start": range.start,
                    "end": range.end,
                }),
            ));
        }

        self.appointments
            .update_schedule(id, range.start, range.end)
            .await?;
        appointment.start_time = range.start;
        appointment.end_time = range.end;

        tracing::info!("Rescheduled appointment {} to {}", id, range.start);
        Ok(appointment)
    }

    /// Cancel a non-terminal appointment. Capacity frees implicitly because
    /// every capacity/overlap query filters on active status.
    pub async fn cancel(&self, actor: &Actor, id: &str) -> ApiResult<Appointment> {
        let mut appointment = self.load_owned(actor, id).await?;

        validate_transition(appointment.status, AppointmentStatus::Cancelled)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        self.appointments
            .update_status(id, AppointmentStatus::Cancelled)
            .await?;
        self.publish_status_change(&appointment, AppointmentStatus::Cancelled, &actor.user_id);
        appointment.status = AppointmentStatus::Cancelled;

        tracing::info!("Cancelled appointment {}", id);
        Ok(appointment)
    }

    /// Apply a status transition. Completion publishes revenue recognition to
    /// the reporting sink.
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: &str,
        new_status: AppointmentStatus,
    ) -> ApiResult<UpdateStatusResponse> {
        if !actor.role.is_staff() {
            return Err(ApiError::Forbidden(
                "Only staff may update appointment status".to_string(),
            ));
        }

        let mut appointment = self
            .appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Appointment {} not found", id)))?;

        validate_transition(appointment.status, new_status)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        self.appointments.update_status(id, new_status).await?;
        self.publish_status_change(&appointment, new_status, &actor.user_id);
        appointment.status = new_status;

        let revenue = if new_status == AppointmentStatus::Completed {
            let recognized_at = Utc::now();
            self.event_bus.publish(SystemEvent::RevenueRecognized {
                appointment_id: appointment.id.clone(),
                client_id: appointment.client_id.clone(),
                staff_id: appointment.staff_id.clone(),
                amount: appointment.final_amount,
                timestamp: recognized_at.to_rfc3339(),
            });
            Some(RevenueInfo {
                appointment_id: appointment.id.clone(),
                client_id: appointment.client_id.clone(),
                staff_id: appointment.staff_id.clone(),
                amount: appointment.final_amount,
                recognized_at,
            })
        } else {
            None
        };

        Ok(UpdateStatusResponse {
            appointment,
            revenue,
        })
    }

    pub async fn get(&self, actor: &Actor, id: &str) -> ApiResult<Appointment> {
        self.load_owned(actor, id).await
    }

    /// Busy intervals and free-slot percentage for one staff member on one
    /// day.
    pub async fn check_availability(
        &self,
        date: NaiveDate,
        staff_id: &str,
    ) -> ApiResult<AvailabilityResponse> {
        let staff = self
            .staff
            .find_by_id(staff_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Unknown staff member {}", staff_id)))?;

        let appointments = self.appointments.active_for_staff(&staff.id, None).await?;
        let mut busy: Vec<BusySlot> = appointments
            .iter()
            .filter(|a| a.start_time.date_naive() == date)
            .map(|a| BusySlot {
                start: a.start_time,
                end: a.end_time,
            })
            .collect();
        busy.sort_by_key(|s| s.start);

        let settings = self.capacity.settings().await?;
        let slot_starts = settings.slot_starts(date);
        let total = slot_starts.len() as i64;
        let free = slot_starts
            .iter()
            .filter(|start| {
                let slot = TimeRange::from_duration(**start, SLOT_MINUTES);
                !busy
                    .iter()
                    .any(|b| TimeRange::new(b.start, b.end).overlaps(&slot))
            })
            .count() as i64;
        let availability_percent = if total > 0 { free * 100 / total } else { 0 };

        Ok(AvailabilityResponse {
            staff_id: staff.id,
            date,
            busy,
            availability_percent,
        })
    }

    pub async fn available_slots(
        &self,
        date: NaiveDate,
        duration_minutes: i64,
    ) -> ApiResult<SlotListResponse> {
        if duration_minutes <= 0 {
            return Err(ApiError::BadRequest(
                "duration must be positive".to_string(),
            ));
        }
        self.capacity.open_slots(date, duration_minutes).await
    }

    pub async fn capacity_dashboard(&self, date: NaiveDate) -> ApiResult<CapacityDashboard> {
        self.capacity.dashboard(date).await
    }

    // Helpers

    /// Client role books for itself; staff books for an explicit client.
    fn resolve_client(&self, actor: &Actor, requested: Option<&str>) -> ApiResult<String> {
        match actor.role {
            ActorRole::Client => {
                if let Some(explicit) = requested {
                    if explicit != actor.user_id {
                        return Err(ApiError::Forbidden(
                            "Clients may only book for themselves".to_string(),
                        ));
                    }
                }
                Ok(actor.user_id.clone())
            }
            ActorRole::Stylist | ActorRole::Admin => requested
                .map(str::to_string)
                .ok_or_else(|| {
                    ApiError::BadRequest(
                        "client_id is required when booking on behalf of a customer".to_string(),
                    )
                }),
        }
    }

    async fn load_owned(&self, actor: &Actor, id: &str) -> ApiResult<Appointment> {
        let appointment = self
            .appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Appointment {} not found", id)))?;

        if actor.role == ActorRole::Client && appointment.client_id != actor.user_id {
            return Err(ApiError::Forbidden(
                "Appointment belongs to another client".to_string(),
            ));
        }
        Ok(appointment)
    }

    fn publish_status_change(
        &self,
        appointment: &Appointment,
        new_status: AppointmentStatus,
        changed_by: &str,
    ) {
        self.event_bus.publish(SystemEvent::AppointmentStatusChanged {
            appointment_id: appointment.id.clone(),
            old_status: appointment.status,
            new_status,
            changed_by: changed_by.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        });
    }
}
