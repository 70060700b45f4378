use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Header carrying the quota ceiling for the gated action.
pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
/// Header carrying the credits left before the gate closes.
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
/// Header carrying when the quota window rolls over.
pub const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Structured payload for a quota rejection.
///
/// Clients key off `code` to render upgrade prompts instead of generic
/// failure banners, so quota denials must never be folded into 500s.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaRejection {
    pub code: String,
    pub message: String,
    pub used: i64,
    pub limit: i64,
    pub remaining: i64,
    pub resets_at: DateTime<Utc>,
    pub upgrade_url: Option<String>,
}

impl QuotaRejection {
    fn retry_after_secs(&self) -> u64 {
        (self.resets_at - Utc::now()).num_seconds().max(0) as u64
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(anyhow::Error),

    #[error("Forbidden: {0}")]
    Forbidden(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Quota exceeded: {}", .0.code)]
    QuotaExceeded(Box<QuotaRejection>),

    #[error("Dependency failure: {0}")]
    DependencyFailure(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        if let AppError::QuotaExceeded(rejection) = self {
            let retry_after = rejection.retry_after_secs();
            let mut res = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "quota_exceeded",
                    "code": rejection.code,
                    "message": rejection.message,
                    "remaining": rejection.remaining,
                    "used": rejection.used,
                    "limit": rejection.limit,
                    "resetsAt": rejection.resets_at,
                    "upgradeUrl": rejection.upgrade_url,
                })),
            )
                .into_response();

            let headers = res.headers_mut();
            headers.insert(X_RATELIMIT_LIMIT, rejection.limit.into());
            headers.insert(X_RATELIMIT_REMAINING, rejection.remaining.into());
            if let Ok(reset) = HeaderValue::from_str(&rejection.resets_at.to_rfc3339()) {
                headers.insert(X_RATELIMIT_RESET, reset);
            }
            headers.insert(header::RETRY_AFTER, retry_after.into());
            return res;
        }

        let (status, error_message, details) = match self {
            AppError::ValidationError(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error".to_string(),
                Some(err.to_string()),
            ),
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None),
            AppError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err.to_string(), None),
            AppError::Forbidden(err) => (StatusCode::FORBIDDEN, err.to_string(), None),
            AppError::Conflict(err) => (StatusCode::CONFLICT, err.to_string(), None),
            AppError::QuotaExceeded(_) => unreachable!("handled above"),
            AppError::DependencyFailure(err) => {
                tracing::error!(error = %err, "upstream dependency failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream dependency unavailable".to_string(),
                    None,
                )
            }
            AppError::DatabaseError(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::InternalError(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                    None,
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}
