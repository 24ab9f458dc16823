use crate::api::middleware::AppState;
use crate::config::Config;
use crate::database::Database;
use crate::events::EventBus;
use crate::repository::{
    AppointmentRepository, CouponRepository, ServiceCatalog, SettingsRepository, StaffRepository,
};
use crate::services::{
    BookingService, CapacityGuard, ConflictDetector, CouponEngine, SpamGuard, StaffAssigner,
};
use std::sync::Arc;

/// Wire the repositories, guards and engines into the application state. The
/// same `Database` backs every port; services share it through the pool.
pub fn build_app_state(db: Database, config: &Config) -> AppState {
    let appointments: Arc<dyn AppointmentRepository> = Arc::new(db.clone());
    let catalog: Arc<dyn ServiceCatalog> = Arc::new(db.clone());
    let staff: Arc<dyn StaffRepository> = Arc::new(db.clone());
    let coupons: Arc<dyn CouponRepository> = Arc::new(db.clone());
    let settings: Arc<dyn SettingsRepository> = Arc::new(db.clone());

    let event_bus = EventBus::new(config.event_bus_capacity);
    tracing::info!(
        "Event bus initialized with capacity {}",
        config.event_bus_capacity
    );

    let conflicts = ConflictDetector::new(appointments.clone());
    let capacity = CapacityGuard::new(appointments.clone(), settings.clone());
    let assigner = StaffAssigner::new(staff.clone(), conflicts.clone());
    let coupon_engine = CouponEngine::new(coupons);
    let spam = SpamGuard::new(appointments.clone());

    let booking = BookingService::new(
        appointments,
        catalog.clone(),
        staff,
        conflicts,
        capacity,
        assigner,
        coupon_engine.clone(),
        spam,
        event_bus.clone(),
    );
    tracing::info!("Booking service initialized");

    AppState {
        booking,
        coupons: coupon_engine,
        catalog,
        settings,
        event_bus,
    }
}
