use crate::api::middleware::error::ApiError;
use crate::events::EventBus;
use crate::models::{Actor, ActorRole};
use crate::repository::{ServiceCatalog, SettingsRepository};
use crate::services::{BookingService, CouponEngine};
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub booking: BookingService,
    pub coupons: CouponEngine,
    pub catalog: Arc<dyn ServiceCatalog>,
    pub settings: Arc<dyn SettingsRepository>,
    pub event_bus: EventBus,
}

/// Resolve the caller's identity from the gateway-injected headers and stash
/// it in request extensions. Identity issuance itself happens upstream; this
/// service only trusts `x-user-id` / `x-user-role`.
pub async fn require_actor(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let headers = request.headers();

    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let role = headers
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("client")
        .parse::<ActorRole>()
        .map_err(|_| ApiError::Unauthorized)?;

    request.extensions_mut().insert(Actor { user_id, role });
    Ok(next.run(request).await)
}
