pub mod appointments;
pub mod capacity;
pub mod coupons;
pub mod middleware;
pub mod settings;

pub use middleware::{ApiError, ApiResult, AppState};

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/appointments/availability",
            get(appointments::check_availability),
        )
        .route("/api/appointments", post(appointments::create_appointment))
        .route("/api/appointments/:id", get(appointments::get_appointment))
        .route(
            "/api/appointments/:id/status",
            put(appointments::update_status),
        )
        .route(
            "/api/appointments/:id/cancel",
            post(appointments::cancel_appointment),
        )
        .route(
            "/api/appointments/:id/reschedule",
            put(appointments::reschedule_appointment),
        )
        .route("/api/capacity/dashboard", get(capacity::capacity_dashboard))
        .route("/api/capacity/slots", get(capacity::available_slots))
        .route("/api/coupons", get(coupons::list_coupons))
        .route("/api/coupons", post(coupons::create_coupon))
        .route("/api/coupons/:code", put(coupons::update_coupon))
        .route("/api/coupons/:code", delete(coupons::delete_coupon))
        .route("/api/services", get(settings::list_services))
        .route("/api/settings", get(settings::get_settings))
        .route("/api/settings", put(settings::update_setting))
        .layer(axum::middleware::from_fn(middleware::require_actor))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
