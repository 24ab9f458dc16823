use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::{
    api::middleware::{ApiError, ApiResult, AppState},
    models::{Actor, ActorRole, SalonSettings, Service},
};

/// GET /api/services - the bookable service catalog
pub async fn list_services(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
) -> ApiResult<Json<Vec<Service>>> {
    let services = state.catalog.list_services().await?;
    Ok(Json(services))
}

/// GET /api/settings - current capacity configuration (staff only)
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<SalonSettings>> {
    if !actor.role.is_staff() {
        return Err(ApiError::Forbidden(
            "Settings are visible to staff only".to_string(),
        ));
    }
    let settings = state.settings.load().await?;
    Ok(Json(settings))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub key: String,
    pub value: String,
}

/// PUT /api/settings - update one configuration key (admin only)
pub async fn update_setting(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<UpdateSettingRequest>,
) -> ApiResult<Json<SalonSettings>> {
    if actor.role != ActorRole::Admin {
        return Err(ApiError::Forbidden(
            "Settings administration requires the admin role".to_string(),
        ));
    }
    state.settings.set(&req.key, &req.value).await?;
    let settings = state.settings.load().await?;
    Ok(Json(settings))
}
