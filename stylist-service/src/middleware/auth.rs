//! Gateway-resolved identity.
//!
//! Authentication and session resolution happen upstream; this service
//! trusts the user id the gateway forwards on every request.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;
use service_core::middleware::RateLimitKey;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user on this request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!("Missing {} header", USER_ID_HEADER))
            })?;

        let user_id = Uuid::parse_str(raw)
            .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid user id")))?;

        Ok(AuthUser(user_id))
    }
}

/// Tags the request with its throttling subject so the generic window-limit
/// middleware can key per user instead of per IP.
pub async fn attach_rate_limit_key(mut request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Some(key) = key {
        request.extensions_mut().insert(RateLimitKey(key));
    }
    next.run(request).await
}
