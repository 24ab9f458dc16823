use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Stylist,
    Admin,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Stylist => "stylist",
            StaffRole::Admin => "admin",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for StaffRole {
    fn from(s: String) -> Self {
        match s.as_str() {
            "admin" => StaffRole::Admin,
            _ => StaffRole::Stylist,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: StaffRole,
    pub active: bool,
}

impl StaffMember {
    /// Staff who may receive bookings. Any active member qualifies; role
    /// does not restrict bookability.
    pub fn is_bookable(&self) -> bool {
        self.active
    }
}
