use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    api::middleware::{ApiError, ApiResult, AppState},
    models::{Actor, ActorRole, Coupon},
};

fn require_admin(actor: &Actor) -> ApiResult<()> {
    if actor.role != ActorRole::Admin {
        return Err(ApiError::Forbidden(
            "Coupon administration requires the admin role".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CouponListQuery {
    #[serde(default)]
    pub include_expired: bool,
}

/// GET /api/coupons - list the catalog, expired hidden by default
pub async fn list_coupons(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<CouponListQuery>,
) -> ApiResult<Json<Vec<Coupon>>> {
    require_admin(&actor)?;
    let coupons = state.coupons.list_all(params.include_expired).await?;
    Ok(Json(coupons))
}

/// POST /api/coupons
pub async fn create_coupon(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<Coupon>,
) -> ApiResult<(StatusCode, Json<Coupon>)> {
    require_admin(&actor)?;
    let coupon = state.coupons.create(&req).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// PUT /api/coupons/:code
pub async fn update_coupon(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(code): Path<String>,
    Json(mut req): Json<Coupon>,
) -> ApiResult<Json<Coupon>> {
    require_admin(&actor)?;
    req.code = code;
    let coupon = state.coupons.update(&req).await?;
    Ok(Json(coupon))
}

/// DELETE /api/coupons/:code
pub async fn delete_coupon(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(code): Path<String>,
) -> ApiResult<StatusCode> {
    require_admin(&actor)?;
    state.coupons.delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
