mod helpers;

use helpers::*;
use salondesk::api::middleware::ApiError;
use salondesk::models::{AppointmentStatus, SalonSettings};
use salondesk::repository::AppointmentRepository;

#[tokio::test]
async fn test_daily_limit_blocks_and_cancellation_frees() {
    let env = test_env_with(SalonSettings {
        max_daily_appointments: 2,
        ..SalonSettings::default()
    })
    .await;
    let first = seed_appointment(&env, "other1", "s1", at(9, 0), 30).await;
    seed_appointment(&env, "other2", "s2", at(9, 0), 30).await;

    let err = env
        .booking
        .create(
            &client("c1"),
            booking_request(Some("s1"), at(14, 0), &["cut"]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unprocessable { .. }));

    env.appointments
        .update_status(&first.id, AppointmentStatus::Cancelled)
        .await
        .unwrap();

    env.booking
        .create(
            &client("c1"),
            booking_request(Some("s1"), at(14, 0), &["cut"]),
        )
        .await
        .expect("capacity freed by cancellation");
}

#[tokio::test]
async fn test_concurrent_limit_blocks_overlapping_booking() {
    let env = test_env_with(SalonSettings {
        max_concurrent_appointments: 2,
        capacity_warning_threshold: 101,
        ..SalonSettings::default()
    })
    .await;
    env.staff
        .add(salondesk::models::StaffMember {
            id: "s3".to_string(),
            name: "Ava".to_string(),
            role: salondesk::models::StaffRole::Stylist,
            active: true,
        })
        .await;
    seed_appointment(&env, "other1", "s1", at(10, 0), 60).await;
    seed_appointment(&env, "other2", "s2", at(10, 0), 60).await;

    // s3 is free, but the salon as a whole is at its concurrent limit.
    let err = env
        .booking
        .create(
            &client("c1"),
            booking_request(Some("s3"), at(10, 30), &["cut"]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unprocessable { .. }));

    // A window clear of the busy hour goes through.
    env.booking
        .create(
            &client("c2"),
            booking_request(Some("s3"), at(14, 0), &["cut"]),
        )
        .await
        .expect("non-overlapping booking should succeed");
}

#[tokio::test]
async fn test_booking_near_threshold_carries_warning() {
    let env = test_env_with(SalonSettings {
        max_concurrent_appointments: 2,
        capacity_warning_threshold: 80,
        ..SalonSettings::default()
    })
    .await;
    seed_appointment(&env, "other1", "s1", at(10, 0), 60).await;

    // Projected load: two of two stations, 100% >= 80%.
    let response = env
        .booking
        .create(
            &client("c1"),
            booking_request(Some("s2"), at(10, 0), &["cut"]),
        )
        .await
        .unwrap();
    let warning = response.warning.expect("expected a capacity warning");
    assert_eq!(warning.percent, 100);
    assert_eq!(warning.limit, 2);
}

#[tokio::test]
async fn test_disabled_capacity_check_bypasses_limits() {
    let env = test_env_with(SalonSettings {
        max_daily_appointments: 1,
        max_concurrent_appointments: 1,
        enable_capacity_check: false,
        ..SalonSettings::default()
    })
    .await;
    seed_appointment(&env, "other1", "s1", at(10, 0), 60).await;

    let response = env
        .booking
        .create(
            &client("c1"),
            booking_request(Some("s2"), at(10, 0), &["cut"]),
        )
        .await
        .expect("disabled check must not block");
    assert!(response.warning.is_none());
}

#[tokio::test]
async fn test_available_slots_skip_full_windows() {
    let env = test_env_with(SalonSettings {
        max_concurrent_appointments: 1,
        ..SalonSettings::default()
    })
    .await;
    seed_appointment(&env, "other1", "s1", at(9, 0), 60).await;

    let slots = env.booking.available_slots(test_day(), 30).await.unwrap();
    assert_eq!(slots.slots.first().unwrap().start, at(10, 0));
    // 18 half-hour slots minus the two blocked ones.
    assert_eq!(slots.slots.len(), 16);

    let err = env.booking.available_slots(test_day(), 0).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn test_dashboard_summarizes_day() {
    let env = test_env_with(SalonSettings {
        max_daily_appointments: 4,
        max_concurrent_appointments: 2,
        ..SalonSettings::default()
    })
    .await;
    seed_appointment(&env, "other1", "s1", at(10, 0), 60).await;
    seed_appointment(&env, "other2", "s2", at(10, 0), 60).await;

    let dashboard = env.booking.capacity_dashboard(test_day()).await.unwrap();
    assert_eq!(dashboard.daily_count, 2);
    assert_eq!(dashboard.daily_utilization_percent, 50);
    assert_eq!(dashboard.peak_concurrent, 2);
    assert_eq!(dashboard.next_available_slot, Some(at(9, 0)));
    assert!(dashboard
        .recommendations
        .iter()
        .any(|r| r.contains("concurrent capacity")));
}
