use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    /// Business rule rejected the request (schedule conflict, capacity,
    /// invalid coupon). Carries structured context so the caller can retry
    /// intelligently without re-deriving state.
    Unprocessable {
        message: String,
        details: Value,
    },
    RateLimited {
        message: String,
        retry_after_seconds: Option<u64>,
    },
    Internal(String),
}

impl ApiError {
    pub fn unprocessable(message: impl Into<String>, details: Value) -> Self {
        ApiError::Unprocessable {
            message: message.into(),
            details,
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_seconds: Option<u64>) -> Self {
        ApiError::RateLimited {
            message: message.into(),
            retry_after_seconds,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::Unprocessable { message, .. } => write!(f, "Unprocessable: {}", message),
            ApiError::RateLimited { message, .. } => write!(f, "Rate limited: {}", message),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            ApiError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Unprocessable { message, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": message, "details": details })),
            )
                .into_response(),
            ApiError::RateLimited {
                message,
                retry_after_seconds,
            } => {
                let body = Json(json!({
                    "error": message,
                    "retry_after_seconds": retry_after_seconds,
                }));
                let mut response =
                    (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                if let Some(secs) = retry_after_seconds {
                    if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                        response.headers_mut().insert(header::RETRY_AFTER, value);
                    }
                }
                response
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": msg })),
            )
                .into_response(),
        }
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                // The partial unique index on active (staff_id, start_time)
                // fires on concurrent duplicate submissions.
                if message.contains("UNIQUE") || message.contains("unique") {
                    ApiError::unprocessable(
                        "Staff member already booked at this start time",
                        json!({ "reason": "duplicate_booking" }),
                    )
                } else {
                    ApiError::Internal(format!("Database error: {}", message))
                }
            }
            _ => ApiError::Internal("Internal server error".to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
