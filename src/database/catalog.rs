use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::{Service, StaffMember, StaffRole};
use crate::repository::{ServiceCatalog, StaffRepository};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

fn service_from_row(row: &SqliteRow) -> ApiResult<Service> {
    Ok(Service {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        duration_minutes: row.try_get("duration_minutes")?,
        price: row.try_get("price")?,
        active: row.try_get::<i64, _>("active")? != 0,
    })
}

fn staff_from_row(row: &SqliteRow) -> ApiResult<StaffMember> {
    Ok(StaffMember {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        role: StaffRole::from(row.try_get::<String, _>("role")?),
        active: row.try_get::<i64, _>("active")? != 0,
    })
}

#[async_trait::async_trait]
impl ServiceCatalog for Database {
    async fn find_services(&self, ids: &[String]) -> ApiResult<Vec<Service>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, duration_minutes, price, active FROM services \
             WHERE active = 1 AND id IN ({})",
            placeholders
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(self.pool()).await?;
        rows.iter().map(service_from_row).collect()
    }

    async fn list_services(&self) -> ApiResult<Vec<Service>> {
        let rows = sqlx::query(
            "SELECT id, name, duration_minutes, price, active FROM services \
             WHERE active = 1 ORDER BY name",
        )
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(service_from_row).collect()
    }
}

#[async_trait::async_trait]
impl StaffRepository for Database {
    async fn find_by_id(&self, id: &str) -> ApiResult<Option<StaffMember>> {
        let row = sqlx::query("SELECT id, name, role, active FROM staff WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(staff_from_row).transpose()
    }

    async fn list_bookable(&self) -> ApiResult<Vec<StaffMember>> {
        // Ascending id keeps auto-assignment deterministic.
        let rows = sqlx::query(
            "SELECT id, name, role, active FROM staff WHERE active = 1 ORDER BY id",
        )
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(staff_from_row).collect()
    }
}
