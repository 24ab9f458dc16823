use salondesk::database::Database;
use uuid::Uuid;

/// File-based SQLite with a unique name per test so tests run in parallel.
pub async fn setup_test_db() -> Database {
    let temp_file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");
    db.run_migrations()
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn insert_test_staff(db: &Database, id: &str, name: &str) {
    sqlx::query("INSERT INTO staff (id, name, role, active) VALUES (?, ?, 'stylist', 1)")
        .bind(id)
        .bind(name)
        .execute(db.pool())
        .await
        .expect("Failed to insert staff");
}

pub async fn insert_test_service(
    db: &Database,
    id: &str,
    name: &str,
    duration_minutes: i64,
    price: i64,
) {
    sqlx::query(
        "INSERT INTO services (id, name, duration_minutes, price, active) VALUES (?, ?, ?, ?, 1)",
    )
    .bind(id)
    .bind(name)
    .bind(duration_minutes)
    .bind(price)
    .execute(db.pool())
    .await
    .expect("Failed to insert service");
}
