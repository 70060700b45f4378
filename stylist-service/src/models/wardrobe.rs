//! Wardrobe item models.

use crate::models::weather::CategoryAdvice;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A single wardrobe item. Season tags and formality are optional; the
/// scorer treats absence permissively rather than as an error.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub seasons: Option<Vec<String>>,
    pub formality_score: Option<i32>,
    pub created_utc: DateTime<Utc>,
}

/// Input for adding a wardrobe item.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewWardrobeItem {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    pub category: Option<String>,
    pub seasons: Option<Vec<String>>,
    #[validate(range(min = 1, max = 10, message = "Formality score must be 1-10"))]
    pub formality_score: Option<i32>,
}

/// A wardrobe item with its per-request scoring result. Not persisted;
/// lifetime is bounded by the request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: WardrobeItem,
    pub seasonal_score: f64,
    pub weather_appropriate: bool,
}

/// Composed outfit returned by the generation step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outfit {
    pub items: Vec<ScoredItem>,
    pub advice: CategoryAdvice,
    pub note: String,
}
