//! Usage snapshot endpoint.

use crate::middleware::AuthUser;
use crate::models::UsageSnapshot;
use crate::startup::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub monthly: UsageSnapshot,
    /// Absent when the user's tier has no daily cap configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily: Option<UsageSnapshot>,
}

/// Current quota standing for the authenticated user. Pure read; nothing is
/// consumed by looking.
pub async fn get_usage(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let monthly = state.quota.check_monthly_limit(user.0).await;

    let daily_cap = state
        .config
        .tiers
        .limits(monthly.tier())
        .daily_generation_cap;
    let daily = if daily_cap > 0 {
        Some(state.quota.check_daily_cap(user.0).await)
    } else {
        None
    };

    Ok(Json(UsageResponse { monthly, daily }))
}
