mod helpers;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use helpers::*;
use salondesk::api::middleware::ApiError;
use salondesk::models::{
    Appointment, AppointmentDetail, AppointmentStatus, Coupon, CouponType,
};
use salondesk::repository::{
    AppointmentRepository, CouponRepository, ServiceCatalog, SettingsRepository, StaffRepository,
};
use uuid::Uuid;

// Both AppointmentRepository and StaffRepository expose find_by_id, so
// appointment lookups go through this disambiguating helper.
async fn fetch(db: &salondesk::database::Database, id: &str) -> Option<Appointment> {
    AppointmentRepository::find_by_id(db, id).await.unwrap()
}

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2027, 6, 1, hour, min, 0).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2027, 6, 1).unwrap()
}

fn appointment(client_id: &str, staff_id: &str, start: DateTime<Utc>, minutes: i64) -> Appointment {
    Appointment {
        id: Uuid::new_v4().to_string(),
        client_id: client_id.to_string(),
        staff_id: staff_id.to_string(),
        start_time: start,
        end_time: start + Duration::minutes(minutes),
        status: AppointmentStatus::Pending,
        total_amount: 30_000,
        discount_amount: 0,
        final_amount: 30_000,
        coupon_code: None,
        notes: Some("walk-in".to_string()),
        created_at: at(8, 0),
    }
}

#[tokio::test]
async fn test_insert_and_fetch_round_trip() {
    let db = setup_test_db().await;
    let a = appointment("c1", "s1", at(10, 0), 45);
    let details = vec![AppointmentDetail::new(&a.id, "cut", 30_000, 45)];

    db.insert_booking(&a, &details).await.unwrap();

    let stored = fetch(&db, &a.id).await.expect("stored");
    assert_eq!(stored.client_id, "c1");
    assert_eq!(stored.start_time, at(10, 0));
    assert_eq!(stored.end_time, at(10, 45));
    assert_eq!(stored.status, AppointmentStatus::Pending);
    assert_eq!(stored.notes.as_deref(), Some("walk-in"));

    let stored_details = db.details_for(&a.id).await.unwrap();
    assert_eq!(stored_details.len(), 1);
    assert_eq!(stored_details[0].service_id, "cut");

    assert!(fetch(&db, "missing").await.is_none());
}

#[tokio::test]
async fn test_insert_rechecks_overlap_inside_transaction() {
    let db = setup_test_db().await;
    db.insert_booking(&appointment("c1", "s1", at(10, 0), 60), &[])
        .await
        .unwrap();

    let second = appointment("c2", "s1", at(10, 30), 60);
    let err = db.insert_booking(&second, &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::Unprocessable { .. }));
    assert!(fetch(&db, &second.id).await.is_none());

    // Adjacent bookings and other staff are fine.
    db.insert_booking(&appointment("c3", "s1", at(11, 0), 30), &[])
        .await
        .unwrap();
    db.insert_booking(&appointment("c4", "s2", at(10, 30), 30), &[])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_duplicate_start_hits_unique_index() {
    let db = setup_test_db().await;
    db.insert_booking(&appointment("c1", "s1", at(10, 0), 0), &[])
        .await
        .unwrap();

    // Zero-length interval sidesteps the overlap recheck, leaving the partial
    // unique index as the last line of defense.
    let err = db
        .insert_booking(&appointment("c2", "s1", at(10, 0), 0), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unprocessable { .. }));
}

#[tokio::test]
async fn test_active_queries_ignore_terminal_statuses() {
    let db = setup_test_db().await;
    let a1 = appointment("c1", "s1", at(9, 0), 60);
    let a2 = appointment("c2", "s1", at(11, 0), 60);
    db.insert_booking(&a1, &[]).await.unwrap();
    db.insert_booking(&a2, &[]).await.unwrap();

    db.update_status(&a1.id, AppointmentStatus::Cancelled)
        .await
        .unwrap();

    let active = db.active_for_staff("s1", None).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, a2.id);

    let excluded = db.active_for_staff("s1", Some(&a2.id)).await.unwrap();
    assert!(excluded.is_empty());

    assert_eq!(db.active_on_day(day()).await.unwrap().len(), 1);

    // Half-open comparison: a booking ending at 11:00 would not collide.
    let overlapping = db.active_overlapping(at(10, 0), at(11, 0)).await.unwrap();
    assert!(overlapping.is_empty());
    let overlapping = db.active_overlapping(at(11, 30), at(12, 30)).await.unwrap();
    assert_eq!(overlapping.len(), 1);
}

#[tokio::test]
async fn test_update_schedule_moves_interval() {
    let db = setup_test_db().await;
    let a = appointment("c1", "s1", at(9, 0), 30);
    db.insert_booking(&a, &[]).await.unwrap();

    db.update_schedule(&a.id, at(15, 0), at(15, 30))
        .await
        .unwrap();
    let stored = fetch(&db, &a.id).await.unwrap();
    assert_eq!(stored.start_time, at(15, 0));

    let err = db
        .update_schedule("missing", at(15, 0), at(15, 30))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_update_schedule_rechecks_overlap_inside_transaction() {
    let db = setup_test_db().await;
    let a = appointment("c1", "s1", at(9, 0), 60);
    let b = appointment("c2", "s1", at(11, 0), 60);
    db.insert_booking(&a, &[]).await.unwrap();
    db.insert_booking(&b, &[]).await.unwrap();

    // Moving b onto a is rejected at persist time and the stored interval
    // stays put.
    let err = db
        .update_schedule(&b.id, at(9, 30), at(10, 30))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unprocessable { .. }));
    assert_eq!(fetch(&db, &b.id).await.unwrap().start_time, at(11, 0));

    // An appointment may slide over its own old interval, and adjacency to a
    // neighbor is allowed.
    db.update_schedule(&a.id, at(9, 15), at(10, 15)).await.unwrap();
    db.update_schedule(&b.id, at(10, 15), at(11, 15)).await.unwrap();

    // Cancelled appointments no longer block the slot.
    db.update_status(&a.id, AppointmentStatus::Cancelled)
        .await
        .unwrap();
    db.update_schedule(&b.id, at(9, 30), at(10, 30)).await.unwrap();
}

#[tokio::test]
async fn test_client_counters() {
    let db = setup_test_db().await;
    let mut early = appointment("c1", "s1", at(9, 0), 30);
    early.created_at = at(7, 0);
    let mut late = appointment("c1", "s2", at(11, 0), 30);
    late.created_at = at(8, 30);
    db.insert_booking(&early, &[]).await.unwrap();
    db.insert_booking(&late, &[]).await.unwrap();

    assert_eq!(db.active_count_for_client("c1").await.unwrap(), 2);
    assert_eq!(db.active_count_for_client("c2").await.unwrap(), 0);
    assert_eq!(db.last_created_at("c1").await.unwrap(), Some(at(8, 30)));
    assert_eq!(db.last_created_at("c2").await.unwrap(), None);
    assert_eq!(
        db.created_count_between("c1", at(0, 0), at(8, 0))
            .await
            .unwrap(),
        1
    );
    assert!(db.duplicate_exists("c1", "s1", at(9, 0)).await.unwrap());
    assert!(!db.duplicate_exists("c1", "s1", at(10, 0)).await.unwrap());
}

#[tokio::test]
async fn test_catalog_and_staff_lookup() {
    let db = setup_test_db().await;
    insert_test_staff(&db, "s2", "Noah").await;
    insert_test_staff(&db, "s1", "Mia").await;
    insert_test_service(&db, "cut", "Haircut", 30, 30_000).await;
    sqlx::query("INSERT INTO services (id, name, duration_minutes, price, active) VALUES ('retired', 'Old', 30, 10000, 0)")
        .execute(db.pool())
        .await
        .unwrap();

    let services = db
        .find_services(&["cut".to_string(), "retired".to_string()])
        .await
        .unwrap();
    // Inactive services are not bookable.
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].id, "cut");

    let bookable = db.list_bookable().await.unwrap();
    assert_eq!(bookable.len(), 2);
    assert_eq!(bookable[0].id, "s1");

    let member = StaffRepository::find_by_id(&db, "s1").await.unwrap();
    assert_eq!(member.unwrap().name, "Mia");
}

#[tokio::test]
async fn test_settings_seeded_and_updatable() {
    let db = setup_test_db().await;

    let settings = db.load().await.unwrap();
    assert_eq!(settings.max_concurrent_appointments, 5);
    assert_eq!(settings.max_daily_appointments, 30);
    assert!(settings.enable_capacity_check);

    db.set("max_daily_appointments", "10").await.unwrap();
    db.set("enable_capacity_check", "false").await.unwrap();
    let settings = db.load().await.unwrap();
    assert_eq!(settings.max_daily_appointments, 10);
    assert!(!settings.enable_capacity_check);

    let err = db.set("unknown_key", "1").await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    let err = db.set("working_hours_start", "25:99").await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn test_coupon_crud() {
    let db = setup_test_db().await;
    let coupon = Coupon {
        code: "welcome10".to_string(),
        coupon_type: CouponType::Percentage,
        value: 10,
        min_amount: 0,
        expiry_date: Utc::now() + Duration::days(30),
        customer_id: None,
        description: Some("New customers".to_string()),
    };
    db.create(&coupon).await.unwrap();

    // Stored and looked up under the normalized code.
    let found = db.find_by_code("  Welcome10 ").await.unwrap().unwrap();
    assert_eq!(found.code, "WELCOME10");
    assert_eq!(found.value, 10);

    let mut updated = found.clone();
    updated.value = 15;
    db.update(&updated).await.unwrap();
    assert_eq!(db.find_by_code("WELCOME10").await.unwrap().unwrap().value, 15);

    let mut expired = coupon.clone();
    expired.code = "OLD".to_string();
    expired.expiry_date = Utc::now() - Duration::days(1);
    db.create(&expired).await.unwrap();

    assert_eq!(db.list_all(false).await.unwrap().len(), 1);
    assert_eq!(db.list_all(true).await.unwrap().len(), 2);

    assert!(db.delete("old").await.unwrap());
    assert!(!db.delete("old").await.unwrap());
}

#[tokio::test]
async fn test_coupon_update_unknown_code_is_not_found() {
    let db = setup_test_db().await;
    let ghost = Coupon {
        code: "ghost".to_string(),
        coupon_type: CouponType::Fixed,
        value: 5_000,
        min_amount: 0,
        expiry_date: Utc::now() + Duration::days(30),
        customer_id: None,
        description: None,
    };

    let err = db.update(&ghost).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    // Nothing was stored as a side effect.
    assert!(db.find_by_code("GHOST").await.unwrap().is_none());
}
