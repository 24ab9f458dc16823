use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use salondesk::events::EventBus;
use salondesk::models::{
    Actor, ActorRole, Appointment, AppointmentStatus, CreateAppointmentRequest, SalonSettings,
    Service, StaffMember, StaffRole,
};
use salondesk::repository::memory::{
    InMemoryAppointmentRepository, InMemoryCouponRepository, InMemoryServiceCatalog,
    InMemorySettingsRepository, InMemoryStaffRepository,
};
use salondesk::services::{
    BookingService, CapacityGuard, ConflictDetector, CouponEngine, SpamGuard, StaffAssigner,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct TestEnv {
    pub appointments: Arc<InMemoryAppointmentRepository>,
    pub staff: Arc<InMemoryStaffRepository>,
    pub catalog: Arc<InMemoryServiceCatalog>,
    pub coupons: Arc<InMemoryCouponRepository>,
    pub event_bus: EventBus,
    pub booking: BookingService,
}

/// In-memory wiring with two stylists and two services pre-seeded:
/// s1/s2, "cut" (30 min, 30 000) and "color" (45 min, 50 000).
pub async fn test_env() -> TestEnv {
    test_env_with(SalonSettings::default()).await
}

pub async fn test_env_with(settings: SalonSettings) -> TestEnv {
    let appointments = Arc::new(InMemoryAppointmentRepository::new());
    let staff = Arc::new(InMemoryStaffRepository::new());
    let catalog = Arc::new(InMemoryServiceCatalog::new());
    let coupons = Arc::new(InMemoryCouponRepository::new());
    let settings_repo = Arc::new(InMemorySettingsRepository::new(settings));
    let event_bus = EventBus::new(100);

    staff
        .add(StaffMember {
            id: "s1".to_string(),
            name: "Mia".to_string(),
            role: StaffRole::Stylist,
            active: true,
        })
        .await;
    staff
        .add(StaffMember {
            id: "s2".to_string(),
            name: "Noah".to_string(),
            role: StaffRole::Stylist,
            active: true,
        })
        .await;
    catalog
        .add(Service {
            id: "cut".to_string(),
            name: "Haircut".to_string(),
            duration_minutes: 30,
            price: 30_000,
            active: true,
        })
        .await;
    catalog
        .add(Service {
            id: "color".to_string(),
            name: "Coloring".to_string(),
            duration_minutes: 45,
            price: 50_000,
            active: true,
        })
        .await;

    let conflicts = ConflictDetector::new(appointments.clone());
    let capacity = CapacityGuard::new(appointments.clone(), settings_repo.clone());
    let assigner = StaffAssigner::new(staff.clone(), conflicts.clone());
    let coupon_engine = CouponEngine::new(coupons.clone());
    let spam = SpamGuard::new(appointments.clone());

    let booking = BookingService::new(
        appointments.clone(),
        catalog.clone(),
        staff.clone(),
        conflicts,
        capacity,
        assigner,
        coupon_engine,
        spam,
        event_bus.clone(),
    );

    TestEnv {
        appointments,
        staff,
        catalog,
        coupons,
        event_bus,
        booking,
    }
}

/// A day far enough out that every slot is in the future.
pub fn test_day() -> NaiveDate {
    (Utc::now() + Duration::days(30)).date_naive()
}

pub fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&test_day().and_hms_opt(hour, min, 0).unwrap())
}

pub fn client(id: &str) -> Actor {
    Actor {
        user_id: id.to_string(),
        role: ActorRole::Client,
    }
}

pub fn stylist(id: &str) -> Actor {
    Actor {
        user_id: id.to_string(),
        role: ActorRole::Stylist,
    }
}

pub fn admin(id: &str) -> Actor {
    Actor {
        user_id: id.to_string(),
        role: ActorRole::Admin,
    }
}

pub fn booking_request(
    staff_id: Option<&str>,
    start: DateTime<Utc>,
    service_ids: &[&str],
) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        staff_id: staff_id.map(str::to_string),
        start_time: start,
        service_ids: service_ids.iter().map(|s| s.to_string()).collect(),
        coupon_code: None,
        client_id: None,
        notes: None,
    }
}

/// Insert an appointment directly, with `created_at` in the past so seeded
/// data never trips the creation cooldown.
pub async fn seed_appointment(
    env: &TestEnv,
    client_id: &str,
    staff_id: &str,
    start: DateTime<Utc>,
    minutes: i64,
) -> Appointment {
    use salondesk::repository::AppointmentRepository;

    let appointment = Appointment {
        id: Uuid::new_v4().to_string(),
        client_id: client_id.to_string(),
        staff_id: staff_id.to_string(),
        start_time: start,
        end_time: start + Duration::minutes(minutes),
        status: AppointmentStatus::Confirmed,
        total_amount: 30_000,
        discount_amount: 0,
        final_amount: 30_000,
        coupon_code: None,
        notes: None,
        created_at: Utc::now() - Duration::days(2),
    };
    env.appointments
        .insert_booking(&appointment, &[])
        .await
        .expect("Failed to seed appointment");
    appointment
}
