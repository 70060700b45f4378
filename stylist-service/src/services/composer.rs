//! Outfit composition seam.
//!
//! Composition policy is owned by the downstream generation pipeline; this
//! trait is the boundary it plugs into. The default implementation is a
//! deterministic top-pick so the route is usable standalone.

use crate::config::TemperatureBands;
use crate::models::{CategoryAdvice, Outfit, ScoredItem, TemperatureBand, WeatherContext};
use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::HashSet;
use uuid::Uuid;

#[async_trait]
pub trait OutfitComposer: Send + Sync {
    /// Compose an outfit from the scored, ranked wardrobe. `items` arrive in
    /// ranking order: weather-appropriate first, best seasonal fit first.
    async fn compose(
        &self,
        user_id: Uuid,
        items: &[ScoredItem],
        weather: &WeatherContext,
        advice: CategoryAdvice,
    ) -> Result<Outfit, AppError>;
}

/// Picks the highest-ranked item per category, up to a small outfit size.
pub struct TopPickComposer {
    bands: TemperatureBands,
    max_items: usize,
}

impl TopPickComposer {
    pub fn new(bands: TemperatureBands) -> Self {
        Self {
            bands,
            max_items: 5,
        }
    }
}

#[async_trait]
impl OutfitComposer for TopPickComposer {
    async fn compose(
        &self,
        _user_id: Uuid,
        items: &[ScoredItem],
        weather: &WeatherContext,
        advice: CategoryAdvice,
    ) -> Result<Outfit, AppError> {
        let mut seen_categories = HashSet::new();
        let mut picks = Vec::new();

        for scored in items {
            if picks.len() >= self.max_items {
                break;
            }
            if !scored.weather_appropriate {
                continue;
            }
            let category = scored
                .item
                .category
                .as_deref()
                .unwrap_or("other")
                .to_ascii_lowercase();
            if seen_categories.insert(category) {
                picks.push(scored.clone());
            }
        }

        let band = TemperatureBand::from_celsius(weather.temperature_celsius, &self.bands);

        Ok(Outfit {
            items: picks,
            advice,
            note: format!(
                "Styled for {} weather ({:.0} degrees C)",
                band.as_str(),
                weather.temperature_celsius
            ),
        })
    }
}
