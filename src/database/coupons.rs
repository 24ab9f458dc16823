use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::{fmt_ts, parse_ts, Database};
use crate::models::{Coupon, CouponType};
use crate::repository::CouponRepository;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

fn coupon_from_row(row: &SqliteRow) -> ApiResult<Coupon> {
    Ok(Coupon {
        code: row.try_get("code")?,
        coupon_type: CouponType::from(row.try_get::<String, _>("coupon_type")?),
        value: row.try_get("value")?,
        min_amount: row.try_get("min_amount")?,
        expiry_date: parse_ts(&row.try_get::<String, _>("expiry_date")?)?,
        customer_id: row.try_get("customer_id")?,
        description: row.try_get("description")?,
    })
}

const SELECT_COUPON: &str = "SELECT code, coupon_type, value, min_amount, expiry_date, \
     customer_id, description FROM coupons";

#[async_trait::async_trait]
impl CouponRepository for Database {
    async fn find_by_code(&self, code: &str) -> ApiResult<Option<Coupon>> {
        let row = sqlx::query(&format!("{} WHERE code = ?", SELECT_COUPON))
            .bind(Coupon::normalize_code(code))
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(coupon_from_row).transpose()
    }

    async fn create(&self, coupon: &Coupon) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO coupons (code, coupon_type, value, min_amount, expiry_date, customer_id, description) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Coupon::normalize_code(&coupon.code))
        .bind(coupon.coupon_type.as_str())
        .bind(coupon.value)
        .bind(coupon.min_amount)
        .bind(fmt_ts(coupon.expiry_date))
        .bind(&coupon.customer_id)
        .bind(&coupon.description)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn update(&self, coupon: &Coupon) -> ApiResult<()> {
        let code = Coupon::normalize_code(&coupon.code);
        let result = sqlx::query(
            "UPDATE coupons SET coupon_type = ?, value = ?, min_amount = ?, expiry_date = ?, \
             customer_id = ?, description = ? WHERE code = ?",
        )
        .bind(coupon.coupon_type.as_str())
        .bind(coupon.value)
        .bind(coupon.min_amount)
        .bind(fmt_ts(coupon.expiry_date))
        .bind(&coupon.customer_id)
        .bind(&coupon.description)
        .bind(&code)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Coupon {} not found", code)));
        }
        Ok(())
    }

    async fn delete(&self, code: &str) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM coupons WHERE code = ?")
            .bind(Coupon::normalize_code(code))
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self, include_expired: bool) -> ApiResult<Vec<Coupon>> {
        let rows = if include_expired {
            sqlx::query(&format!("{} ORDER BY code", SELECT_COUPON))
                .fetch_all(self.pool())
                .await?
        } else {
            sqlx::query(&format!(
                "{} WHERE expiry_date >= ? ORDER BY code",
                SELECT_COUPON
            ))
            .bind(fmt_ts(Utc::now()))
            .fetch_all(self.pool())
            .await?
        };
        rows.iter().map(coupon_from_row).collect()
    }
}
