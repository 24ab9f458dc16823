use crate::api::middleware::error::{ApiError, ApiResult};
use crate::models::{Coupon, CouponQuote};
use crate::repository::CouponRepository;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

/// Validates coupon codes and computes discounts against the injected
/// catalog.
#[derive(Clone)]
pub struct CouponEngine {
    coupons: Arc<dyn CouponRepository>,
}

impl CouponEngine {
    pub fn new(coupons: Arc<dyn CouponRepository>) -> Self {
        Self { coupons }
    }

    /// Validates `code` for `client_id` against `total_amount` and returns
    /// the resulting quote. Fails fast on the first violated rule.
    pub async fn validate(
        &self,
        code: &str,
        total_amount: i64,
        client_id: &str,
        now: DateTime<Utc>,
    ) -> ApiResult<CouponQuote> {
        let normalized = Coupon::normalize_code(code);
        let coupon = self
            .coupons
            .find_by_code(&normalized)
            .await?
            .ok_or_else(|| {
                ApiError::unprocessable(
                    format!("Unknown coupon code {}", normalized),
                    json!({ "reason": "coupon_unknown", "code": normalized }),
                )
            })?;

        if coupon.is_expired(now) {
            return Err(ApiError::unprocessable(
                format!("Coupon {} has expired", normalized),
                json!({
                    "reason": "coupon_expired",
                    "code": normalized,
                    "expired_at": coupon.expiry_date,
                }),
            ));
        }

        if total_amount < coupon.min_amount {
            return Err(ApiError::unprocessable(
                format!(
                    "Coupon {} requires a minimum amount of {}",
                    normalized, coupon.min_amount
                ),
                json!({
                    "reason": "coupon_below_minimum",
                    "code": normalized,
                    "min_amount": coupon.min_amount,
                    "total_amount": total_amount,
                }),
            ));
        }

        // A coupon without a customer restriction is public.
        if let Some(owner) = &coupon.customer_id {
            if owner != client_id {
                return Err(ApiError::unprocessable(
                    format!("Coupon {} is reserved for another customer", normalized),
                    json!({ "reason": "coupon_restricted", "code": normalized }),
                ));
            }
        }

        let discount_amount = coupon.discount_for(total_amount);
        Ok(CouponQuote {
            code: normalized,
            discount_amount,
            final_amount: total_amount - discount_amount,
        })
    }

    // Catalog administration, passed through to the repository.

    pub async fn create(&self, coupon: &Coupon) -> ApiResult<Coupon> {
        let mut stored = coupon.clone();
        stored.code = Coupon::normalize_code(&coupon.code);
        self.coupons.create(&stored).await?;
        Ok(stored)
    }

    pub async fn update(&self, coupon: &Coupon) -> ApiResult<Coupon> {
        let mut stored = coupon.clone();
        stored.code = Coupon::normalize_code(&coupon.code);
        self.coupons.update(&stored).await?;
        Ok(stored)
    }

    pub async fn delete(&self, code: &str) -> ApiResult<()> {
        if !self.coupons.delete(code).await? {
            return Err(ApiError::NotFound(format!(
                "Coupon {} not found",
                Coupon::normalize_code(code)
            )));
        }
        Ok(())
    }

    pub async fn list_all(&self, include_expired: bool) -> ApiResult<Vec<Coupon>> {
        self.coupons.list_all(include_expired).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CouponType;
    use crate::repository::memory::InMemoryCouponRepository;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn coupon(code: &str, coupon_type: CouponType, value: i64) -> Coupon {
        Coupon {
            code: code.to_string(),
            coupon_type,
            value,
            min_amount: 0,
            expiry_date: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            customer_id: None,
            description: None,
        }
    }

    async fn engine_with(coupons: Vec<Coupon>) -> CouponEngine {
        let repo = Arc::new(InMemoryCouponRepository::new());
        for c in &coupons {
            repo.create(c).await.unwrap();
        }
        CouponEngine::new(repo)
    }

    #[tokio::test]
    async fn test_percentage_quote() {
        let engine = engine_with(vec![coupon("TEN", CouponType::Percentage, 10)]).await;
        let quote = engine.validate("TEN", 100_000, "client-1", now()).await.unwrap();
        assert_eq!(quote.discount_amount, 10_000);
        assert_eq!(quote.final_amount, 90_000);
    }

    #[tokio::test]
    async fn test_fixed_quote_capped() {
        let engine = engine_with(vec![coupon("FLAT", CouponType::Fixed, 20_000)]).await;
        let quote = engine.validate("FLAT", 15_000, "client-1", now()).await.unwrap();
        assert_eq!(quote.discount_amount, 15_000);
        assert_eq!(quote.final_amount, 0);
    }

    #[tokio::test]
    async fn test_lookup_is_normalized() {
        let engine = engine_with(vec![coupon("WELCOME10", CouponType::Percentage, 10)]).await;
        assert!(engine
            .validate("  welcome10 ", 50_000, "client-1", now())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unknown_code_rejected() {
        let engine = engine_with(vec![]).await;
        let err = engine
            .validate("NOPE", 50_000, "client-1", now())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable { .. }));
    }

    #[tokio::test]
    async fn test_expired_rejected_regardless_of_amount() {
        let mut expired = coupon("OLD", CouponType::Percentage, 50);
        expired.expiry_date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let engine = engine_with(vec![expired]).await;
        let err = engine
            .validate("OLD", 1_000_000, "client-1", now())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable { .. }));
    }

    #[tokio::test]
    async fn test_below_minimum_rejected() {
        let mut c = coupon("BIGSPEND", CouponType::Fixed, 5_000);
        c.min_amount = 50_000;
        let engine = engine_with(vec![c]).await;
        assert!(engine
            .validate("BIGSPEND", 40_000, "client-1", now())
            .await
            .is_err());
        assert!(engine
            .validate("BIGSPEND", 50_000, "client-1", now())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_customer_restriction() {
        let mut c = coupon("VIP", CouponType::Percentage, 20);
        c.customer_id = Some("client-1".to_string());
        let engine = engine_with(vec![c]).await;
        assert!(engine.validate("VIP", 10_000, "client-1", now()).await.is_ok());
        assert!(engine.validate("VIP", 10_000, "client-2", now()).await.is_err());
    }

    #[tokio::test]
    async fn test_list_all_filters_expired() {
        let mut expired = coupon("OLD", CouponType::Percentage, 10);
        expired.expiry_date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let engine = engine_with(vec![coupon("FRESH", CouponType::Fixed, 1_000), expired]).await;

        let current = engine.list_all(false).await.unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].code, "FRESH");

        let all = engine.list_all(true).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
