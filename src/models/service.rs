use serde::{Deserialize, Serialize};

/// Entry in the salon's service catalog. The catalog itself is maintained by
/// the product CRUD outside this engine; bookings only read from it (the
/// schema enforces the 15-minute duration floor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub duration_minutes: i64,
    pub price: i64,
    pub active: bool,
}
