use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponType {
    Percentage,
    Fixed,
}

impl CouponType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponType::Percentage => "percentage",
            CouponType::Fixed => "fixed",
        }
    }
}

impl fmt::Display for CouponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for CouponType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "fixed" => CouponType::Fixed,
            _ => CouponType::Percentage,
        }
    }
}

/// A discount rule. Codes are stored normalized (uppercased, trimmed);
/// lookups normalize the same way. A coupon without `customer_id` is public.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub coupon_type: CouponType,
    pub value: i64,
    pub min_amount: i64,
    pub expiry_date: DateTime<Utc>,
    pub customer_id: Option<String>,
    pub description: Option<String>,
}

impl Coupon {
    /// Normalized form used for storage and lookup.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }

    /// Discount for `total_amount`, clamped so the final amount is never
    /// negative.
    pub fn discount_for(&self, total_amount: i64) -> i64 {
        let raw = match self.coupon_type {
            CouponType::Percentage => total_amount * self.value / 100,
            CouponType::Fixed => self.value,
        };
        raw.clamp(0, total_amount)
    }
}

/// Outcome of a successful coupon validation.
#[derive(Debug, Clone, Serialize)]
pub struct CouponQuote {
    pub code: String,
    pub discount_amount: i64,
    pub final_amount: i64,
}
