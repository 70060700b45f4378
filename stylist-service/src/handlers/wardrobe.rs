//! Wardrobe endpoints.

use crate::middleware::AuthUser;
use crate::models::{CategoryAdvice, NewWardrobeItem, ScoredItem, Tier, WeatherContext};
use crate::startup::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

/// Add a wardrobe item. Upload rate is throttled by the window-limit
/// middleware on this route; the tier's item ceiling is enforced here.
pub async fn add_wardrobe_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<NewWardrobeItem>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let tier = match state.subscriptions.subscription_tier(user.0).await {
        Ok(tier) => tier,
        Err(error) => {
            tracing::warn!(user_id = %user.0, %error, "subscription lookup failed, assuming free tier");
            Tier::Free
        }
    };

    let max_items = state.config.tiers.limits(tier).max_wardrobe_items;
    let count = state.wardrobe.count_items(user.0).await?;
    if count >= max_items {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Wardrobe is full ({} of {} items on the {} tier)",
            count,
            max_items,
            tier.as_str()
        )));
    }

    let item = state.wardrobe.add_item(user.0, &req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScoreQuery {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be -90..90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be -180..180"))]
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub weather: WeatherContext,
    pub advice: CategoryAdvice,
    pub items: Vec<ScoredItem>,
}

/// Preview how the current weather scores and ranks the wardrobe. Read-only
/// and not quota-gated.
pub async fn score_wardrobe(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ScoreQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let weather = state.weather.current(query.latitude, query.longitude).await?;
    let items = state.wardrobe.list_items(user.0).await?;
    let scored = state.scorer.filter_and_rank(&items, &weather);
    let advice = state.scorer.category_advice(&weather);

    Ok(Json(ScoreResponse {
        weather,
        advice,
        items: scored,
    }))
}
