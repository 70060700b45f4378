//! Quota gate for the generate route.
//!
//! Every quota dimension must pass before the action runs. The first
//! failing dimension determines the rejection code and wording; the
//! reported `remaining` is the conservative minimum across all checked
//! dimensions. Rate-limit telemetry headers are attached on success too, so
//! clients can surface remaining credits proactively.

use crate::middleware::AuthUser;
use crate::models::{QuotaDimension, UsageSnapshot};
use crate::services::metrics::record_quota_check;
use crate::startup::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use service_core::error::{
    AppError, QuotaRejection, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET,
};

/// Pre-action quota telemetry, inserted into request extensions for the
/// gated handler.
#[derive(Debug, Clone)]
pub struct QuotaStatus(pub UsageSnapshot);

fn rejection_message(snapshot: &UsageSnapshot) -> String {
    match (snapshot.dimension, snapshot.is_pro) {
        (QuotaDimension::MonthlyCredits, false) => format!(
            "You've used all {} of your free styling credits this month. Upgrade to Pro for more.",
            snapshot.limit
        ),
        (QuotaDimension::MonthlyCredits, true) => format!(
            "You've reached your monthly limit of {} generations.",
            snapshot.limit
        ),
        (QuotaDimension::DailyCap, false) => format!(
            "You've hit today's limit of {} generations. Come back tomorrow or upgrade to Pro.",
            snapshot.limit
        ),
        (QuotaDimension::DailyCap, true) => format!(
            "You've hit today's limit of {} generations. Come back tomorrow.",
            snapshot.limit
        ),
    }
}

/// Gates a protected action behind all configured quota dimensions.
pub async fn generation_quota_middleware(
    State(state): State<AppState>,
    user: AuthUser,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let mut dimensions = Vec::with_capacity(2);

    let monthly = state.quota.check_monthly_limit(user.0).await;
    record_quota_check(
        monthly.dimension.as_str(),
        if monthly.allowed() { "allowed" } else { "denied" },
    );

    // A zero cap disables the daily dimension for that tier; including it
    // would read as limit 0 and block every request.
    let daily_cap = state
        .config
        .tiers
        .limits(monthly.tier())
        .daily_generation_cap;
    dimensions.push(monthly);

    if daily_cap > 0 {
        let daily = state.quota.check_daily_cap(user.0).await;
        record_quota_check(
            daily.dimension.as_str(),
            if daily.allowed() { "allowed" } else { "denied" },
        );
        dimensions.push(daily);
    }

    let min_remaining = dimensions
        .iter()
        .map(|s| s.remaining)
        .min()
        .unwrap_or_default();

    if let Some(failed) = dimensions.iter().find(|s| !s.allowed()) {
        tracing::info!(
            user_id = %user.0,
            code = failed.dimension.code(),
            used = failed.used,
            limit = failed.limit,
            "generation blocked by quota"
        );
        return Err(AppError::QuotaExceeded(Box::new(QuotaRejection {
            code: failed.dimension.code().to_string(),
            message: rejection_message(failed),
            used: failed.used,
            limit: failed.limit,
            remaining: min_remaining,
            resets_at: failed.resets_at,
            upgrade_url: (!failed.is_pro).then(|| state.config.quota.upgrade_url.clone()),
        })));
    }

    // Tightest dimension drives the telemetry headers.
    let tightest = dimensions
        .iter()
        .min_by_key(|s| s.remaining)
        .cloned()
        .expect("at least one quota dimension is always checked");

    request.extensions_mut().insert(QuotaStatus(tightest.clone()));

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, tightest.limit.into());
    headers.insert(X_RATELIMIT_REMAINING, min_remaining.into());
    if let Ok(reset) = HeaderValue::from_str(&tightest.resets_at.to_rfc3339()) {
        headers.insert(X_RATELIMIT_RESET, reset);
    }
    Ok(response)
}
