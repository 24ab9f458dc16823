use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    api::middleware::{ApiResult, AppState},
    models::{
        Actor, Appointment, AvailabilityResponse, BookingResponse, CreateAppointmentRequest,
        RescheduleRequest, UpdateStatusRequest, UpdateStatusResponse,
    },
};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub staff_id: String,
}

/// GET /api/appointments/availability - busy slots for one staff member
pub async fn check_availability(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Query(params): Query<AvailabilityQuery>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let response = state
        .booking
        .check_availability(params.date, &params.staff_id)
        .await?;
    Ok(Json(response))
}

/// POST /api/appointments - book an appointment
pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<BookingResponse>)> {
    let response = state.booking.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/appointments/:id
pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let appointment = state.booking.get(&actor, &id).await?;
    Ok(Json(appointment))
}

/// PUT /api/appointments/:id/status - staff-only status transition
pub async fn update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<UpdateStatusResponse>> {
    let response = state.booking.update_status(&actor, &id, req.status).await?;
    Ok(Json(response))
}

/// POST /api/appointments/:id/cancel
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let appointment = state.booking.cancel(&actor, &id).await?;
    Ok(Json(appointment))
}

/// PUT /api/appointments/:id/reschedule - pending appointments only
pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(req): Json<RescheduleRequest>,
) -> ApiResult<Json<Appointment>> {
    let appointment = state
        .booking
        .reschedule(&actor, &id, req.new_start)
        .await?;
    Ok(Json(appointment))
}
