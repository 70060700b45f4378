//! Outfit generation endpoint.

use crate::middleware::{AuthUser, QuotaStatus};
use crate::models::{Outfit, UsageSnapshot, WeatherContext};
use crate::services::metrics::record_generation;
use crate::startup::AppState;
use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateOutfitRequest {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be -90..90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be -180..180"))]
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutfitResponse {
    pub outfit: Outfit,
    pub weather: WeatherContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageSnapshot>,
}

/// Generate a styled outfit. Quota-gated by `generation_quota_middleware`;
/// the persisted generation event here is what a later quota check counts.
pub async fn generate_outfit(
    State(state): State<AppState>,
    user: AuthUser,
    quota: Option<Extension<QuotaStatus>>,
    Json(req): Json<GenerateOutfitRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let weather = state.weather.current(req.latitude, req.longitude).await?;
    let items = state.wardrobe.list_items(user.0).await?;
    let scored = state.scorer.filter_and_rank(&items, &weather);
    let advice = state.scorer.category_advice(&weather);

    let outfit = state
        .composer
        .compose(user.0, &scored, &weather, advice)
        .await?;

    // Source of truth for usage: if this write fails the generation must
    // fail too, or the user would get uncounted credits.
    state.events.record_event(user.0, "outfit_generation").await?;

    let usage = quota.map(|Extension(QuotaStatus(snapshot))| {
        record_generation(if snapshot.is_pro { "pro" } else { "free" });
        UsageSnapshot::from_count(
            snapshot.dimension,
            snapshot.used + 1,
            snapshot.limit,
            snapshot.resets_at,
            snapshot.is_pro,
        )
    });

    tracing::info!(
        user_id = %user.0,
        items = outfit.items.len(),
        "outfit generated"
    );

    Ok(Json(GenerateOutfitResponse {
        outfit,
        weather,
        usage,
    }))
}
