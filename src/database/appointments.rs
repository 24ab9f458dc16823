use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::{day_bounds, fmt_ts, parse_ts, Database, ACTIVE_STATUS_SQL};
use crate::models::{Appointment, AppointmentDetail, AppointmentStatus, TimeRange};
use crate::repository::AppointmentRepository;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

fn appointment_from_row(row: &SqliteRow) -> ApiResult<Appointment> {
    Ok(Appointment {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        staff_id: row.try_get("staff_id")?,
        start_time: parse_ts(&row.try_get::<String, _>("start_time")?)?,
        end_time: parse_ts(&row.try_get::<String, _>("end_time")?)?,
        status: AppointmentStatus::from(row.try_get::<String, _>("status")?),
        total_amount: row.try_get("total_amount")?,
        discount_amount: row.try_get("discount_amount")?,
        final_amount: row.try_get("final_amount")?,
        coupon_code: row.try_get("coupon_code")?,
        notes: row.try_get("notes")?,
        created_at: parse_ts(&row.try_get::<String, _>("created_at")?)?,
    })
}

const SELECT_APPOINTMENT: &str = "SELECT id, client_id, staff_id, start_time, end_time, status, \
     total_amount, discount_amount, final_amount, coupon_code, notes, created_at \
     FROM appointments";

#[async_trait::async_trait]
impl AppointmentRepository for Database {
    async fn insert_booking(
        &self,
        appointment: &Appointment,
        details: &[AppointmentDetail],
    ) -> ApiResult<()> {
        let mut tx = self.pool().begin().await?;

        // Re-verify inside the transaction so the earlier conflict check and
        // this insert form one unit of work. Rolled back on any error.
        let rows = sqlx::query(&format!(
            "{} WHERE staff_id = ? AND {}",
            SELECT_APPOINTMENT, ACTIVE_STATUS_SQL
        ))
        .bind(&appointment.staff_id)
        .fetch_all(&mut *tx)
        .await?;

        let range = appointment.range();
        for row in &rows {
            let existing = appointment_from_row(row)?;
            if existing.range().overlaps(&range) {
                return Err(ApiError::unprocessable(
                    "Schedule conflict detected at persist time",
                    json!({
                        "staff_id": appointment.staff_id,
                        "conflicting_appointment_id": existing.id,
                    }),
                ));
            }
        }

        sqlx::query(
            "INSERT INTO appointments (id, client_id, staff_id, start_time, end_time, status, \
             total_amount, discount_amount, final_amount, coupon_code, notes, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&appointment.id)
        .bind(&appointment.client_id)
        .bind(&appointment.staff_id)
        .bind(fmt_ts(appointment.start_time))
        .bind(fmt_ts(appointment.end_time))
        .bind(appointment.status.as_str())
        .bind(appointment.total_amount)
        .bind(appointment.discount_amount)
        .bind(appointment.final_amount)
        .bind(&appointment.coupon_code)
        .bind(&appointment.notes)
        .bind(fmt_ts(appointment.created_at))
        .execute(&mut *tx)
        .await?;

        for detail in details {
            sqlx::query(
                "INSERT INTO appointment_details (id, appointment_id, service_id, price, duration_minutes) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&detail.id)
            .bind(&detail.appointment_id)
            .bind(&detail.service_id)
            .bind(detail.price)
            .bind(detail.duration_minutes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> ApiResult<Option<Appointment>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_APPOINTMENT))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(appointment_from_row).transpose()
    }

    async fn details_for(&self, appointment_id: &str) -> ApiResult<Vec<AppointmentDetail>> {
        let rows = sqlx::query(
            "SELECT id, appointment_id, service_id, price, duration_minutes \
             FROM appointment_details WHERE appointment_id = ?",
        )
        .bind(appointment_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(AppointmentDetail {
                    id: row.try_get("id")?,
                    appointment_id: row.try_get("appointment_id")?,
                    service_id: row.try_get("service_id")?,
                    price: row.try_get("price")?,
                    duration_minutes: row.try_get("duration_minutes")?,
                })
            })
            .collect()
    }

    async fn update_schedule(
        &self,
        id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> ApiResult<()> {
        let mut tx = self.pool().begin().await?;

        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_APPOINTMENT))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let current = row
            .as_ref()
            .map(appointment_from_row)
            .transpose()?
            .ok_or_else(|| ApiError::NotFound(format!("Appointment {} not found", id)))?;

        // Same in-transaction recheck as insert_booking: the caller's conflict
        // check and this write must form one unit of work.
        let rows = sqlx::query(&format!(
            "{} WHERE staff_id = ? AND id != ? AND {}",
            SELECT_APPOINTMENT, ACTIVE_STATUS_SQL
        ))
        .bind(&current.staff_id)
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let range = TimeRange::new(start_time, end_time);
        for row in &rows {
            let existing = appointment_from_row(row)?;
            if existing.range().overlaps(&range) {
                return Err(ApiError::unprocessable(
                    "Schedule conflict detected at persist time",
                    json!({
                        "staff_id": current.staff_id,
                        "conflicting_appointment_id": existing.id,
                    }),
                ));
            }
        }

        sqlx::query("UPDATE appointments SET start_time = ?, end_time = ? WHERE id = ?")
            .bind(fmt_ts(start_time))
            .bind(fmt_ts(end_time))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: AppointmentStatus) -> ApiResult<()> {
        let result = sqlx::query("UPDATE appointments SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Appointment {} not found", id)));
        }
        Ok(())
    }

    async fn active_for_staff(
        &self,
        staff_id: &str,
        exclude_id: Option<&str>,
    ) -> ApiResult<Vec<Appointment>> {
        let rows = match exclude_id {
            Some(exclude) => {
                sqlx::query(&format!(
                    "{} WHERE staff_id = ? AND id != ? AND {}",
                    SELECT_APPOINTMENT, ACTIVE_STATUS_SQL
                ))
                .bind(staff_id)
                .bind(exclude)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "{} WHERE staff_id = ? AND {}",
                    SELECT_APPOINTMENT, ACTIVE_STATUS_SQL
                ))
                .bind(staff_id)
                .fetch_all(self.pool())
                .await?
            }
        };
        rows.iter().map(appointment_from_row).collect()
    }

    async fn active_on_day(&self, date: NaiveDate) -> ApiResult<Vec<Appointment>> {
        let (from, to) = day_bounds(date);
        let rows = sqlx::query(&format!(
            "{} WHERE start_time >= ? AND start_time < ? AND {}",
            SELECT_APPOINTMENT, ACTIVE_STATUS_SQL
        ))
        .bind(from)
        .bind(to)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(appointment_from_row).collect()
    }

    async fn active_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResult<Vec<Appointment>> {
        // Half-open overlap: existing.start < end AND existing.end > start.
        let rows = sqlx::query(&format!(
            "{} WHERE start_time < ? AND end_time > ? AND {}",
            SELECT_APPOINTMENT, ACTIVE_STATUS_SQL
        ))
        .bind(fmt_ts(end))
        .bind(fmt_ts(start))
        .fetch_all(self.pool())
        .await?;

        let window = TimeRange::new(start, end);
        let appointments: ApiResult<Vec<Appointment>> =
            rows.iter().map(appointment_from_row).collect();
        Ok(appointments?
            .into_iter()
            .filter(|a| a.range().overlaps(&window))
            .collect())
    }

    async fn active_count_for_client(&self, client_id: &str) -> ApiResult<i64> {
        let row = sqlx::query(&format!(
            "SELECT COUNT(*) AS n FROM appointments WHERE client_id = ? AND {}",
            ACTIVE_STATUS_SQL
        ))
        .bind(client_id)
        .fetch_one(self.pool())
        .await?;
        Ok(row.try_get("n")?)
    }

    async fn last_created_at(&self, client_id: &str) -> ApiResult<Option<DateTime<Utc>>> {
        let row = sqlx::query(
            "SELECT created_at FROM appointments WHERE client_id = ? \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(client_id)
        .fetch_optional(self.pool())
        .await?;
        row.map(|r| parse_ts(&r.try_get::<String, _>("created_at")?))
            .transpose()
    }

    async fn created_count_between(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM appointments \
             WHERE client_id = ? AND created_at >= ? AND created_at < ?",
        )
        .bind(client_id)
        .bind(fmt_ts(from))
        .bind(fmt_ts(to))
        .fetch_one(self.pool())
        .await?;
        Ok(row.try_get("n")?)
    }

    async fn duplicate_exists(
        &self,
        client_id: &str,
        staff_id: &str,
        start_time: DateTime<Utc>,
    ) -> ApiResult<bool> {
        let row = sqlx::query(&format!(
            "SELECT COUNT(*) AS n FROM appointments \
             WHERE client_id = ? AND staff_id = ? AND start_time = ? AND {}",
            ACTIVE_STATUS_SQL
        ))
        .bind(client_id)
        .bind(staff_id)
        .bind(fmt_ts(start_time))
        .fetch_one(self.pool())
        .await?;
        Ok(row.try_get::<i64, _>("n")? > 0)
    }
}
