pub mod auth;
pub mod error;

pub use auth::{require_actor, AppState};
pub use error::{ApiError, ApiResult};
