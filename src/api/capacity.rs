use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    api::middleware::{ApiResult, AppState},
    models::settings::SLOT_MINUTES,
    models::{Actor, CapacityDashboard, SlotListResponse},
};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    #[serde(default = "default_duration")]
    pub duration: i64,
}

fn default_duration() -> i64 {
    SLOT_MINUTES
}

/// GET /api/capacity/dashboard - salon-wide load for one day
pub async fn capacity_dashboard(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Query(params): Query<DashboardQuery>,
) -> ApiResult<Json<CapacityDashboard>> {
    let dashboard = state.booking.capacity_dashboard(params.date).await?;
    Ok(Json(dashboard))
}

/// GET /api/capacity/slots - open slots with remaining concurrent capacity
pub async fn available_slots(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Query(params): Query<SlotsQuery>,
) -> ApiResult<Json<SlotListResponse>> {
    let slots = state
        .booking
        .available_slots(params.date, params.duration)
        .await?;
    Ok(Json(slots))
}
