use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the authenticated actor, as resolved by the upstream auth
/// collaborator. Session issuance itself lives outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Client,
    Stylist,
    Admin,
}

impl ActorRole {
    pub fn is_staff(&self) -> bool {
        matches!(self, ActorRole::Stylist | ActorRole::Admin)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorRole::Client => write!(f, "client"),
            ActorRole::Stylist => write!(f, "stylist"),
            ActorRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for ActorRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "client" => Ok(ActorRole::Client),
            "stylist" => Ok(ActorRole::Stylist),
            "admin" => Ok(ActorRole::Admin),
            _ => Err(()),
        }
    }
}

/// Identity of the caller for the current request.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub role: ActorRole,
}
