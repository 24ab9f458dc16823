pub mod booking_service;
pub mod capacity_guard;
pub mod conflict_detector;
pub mod coupon_engine;
pub mod spam_guard;
pub mod staff_assigner;
pub mod state_machine;

pub use booking_service::BookingService;
pub use capacity_guard::CapacityGuard;
pub use conflict_detector::ConflictDetector;
pub use coupon_engine::CouponEngine;
pub use spam_guard::SpamGuard;
pub use staff_assigner::StaffAssigner;
