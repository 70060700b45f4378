//! Weather-aware wardrobe item scoring.
//!
//! Pure component: given the current weather context it computes, per item,
//! a seasonal-fit score in [0, 1] and a weather-admissibility flag, then
//! ranks the wardrobe for the downstream outfit composition step.

use crate::config::{ScoringConfig, SeasonRow};
use crate::models::{CategoryAdvice, ScoredItem, Season, TemperatureBand, WardrobeItem, WeatherContext};

pub struct WeatherItemScorer {
    cfg: ScoringConfig,
}

impl WeatherItemScorer {
    pub fn new(cfg: ScoringConfig) -> Self {
        Self { cfg }
    }

    fn row(&self, current: Season) -> &SeasonRow {
        let weights = &self.cfg.season_weights;
        match current {
            Season::Spring => &weights.spring,
            Season::Summer => &weights.summer,
            Season::Fall => &weights.fall,
            Season::Winter => &weights.winter,
            Season::All => &weights.all,
        }
    }

    fn tag_weight(&self, current: Season, tag: &str) -> f64 {
        let row = self.row(current);
        match Season::parse(tag) {
            Some(Season::Spring) => row.spring,
            Some(Season::Summer) => row.summer,
            Some(Season::Fall) => row.fall,
            Some(Season::Winter) => row.winter,
            Some(Season::All) => row.all,
            None => self.cfg.unknown_tag_weight,
        }
    }

    /// Seasonal fit of an item against the current season, before any
    /// wet-weather penalty. No tags yields the neutral score; multiple tags
    /// score best-case, not average.
    pub fn seasonal_score(&self, item: &WardrobeItem, current: Season) -> f64 {
        let tags: Vec<&str> = item
            .seasons
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .filter(|tag| !tag.trim().is_empty())
            .collect();

        if tags.is_empty() {
            return self.cfg.neutral_score;
        }

        tags.iter()
            .map(|tag| self.tag_weight(current, tag))
            .fold(f64::MIN, f64::max)
    }

    /// Whether the item's formality fits the current temperature band.
    /// Items without a formality score are always admissible.
    pub fn formality_ok(&self, formality: Option<i32>, temperature: f64) -> bool {
        let Some(formality) = formality else {
            return true;
        };

        let bands = &self.cfg.bands;
        let range = match TemperatureBand::from_celsius(temperature, bands) {
            TemperatureBand::Hot => bands.hot,
            TemperatureBand::Warm => bands.warm,
            TemperatureBand::Mild => bands.mild,
            TemperatureBand::Cool => bands.cool,
            TemperatureBand::Cold => bands.cold,
        };
        range.contains(formality)
    }

    /// Flat penalty for wet-sensitive materials when it rains or snows.
    pub fn wet_penalty(&self, item: &WardrobeItem, weather: &WeatherContext) -> f64 {
        if !weather.is_wet() {
            return 0.0;
        }

        let Some(category) = item.category.as_deref() else {
            return 0.0;
        };
        let category = category.to_ascii_lowercase();

        if self
            .cfg
            .wet_materials
            .iter()
            .any(|material| category.contains(material.to_ascii_lowercase().as_str()))
        {
            self.cfg.wet_penalty
        } else {
            0.0
        }
    }

    /// Score one item against the weather context.
    ///
    /// The appropriateness flag tests the unpenalized seasonal fit so a
    /// borderline material is not penalized twice.
    pub fn score_item(&self, item: &WardrobeItem, weather: &WeatherContext) -> ScoredItem {
        let raw = self.seasonal_score(item, weather.season_suggestion);
        let penalty = self.wet_penalty(item, weather);
        let formality_ok = self.formality_ok(item.formality_score, weather.temperature_celsius);

        ScoredItem {
            item: item.clone(),
            seasonal_score: (raw - penalty).max(0.0),
            weather_appropriate: formality_ok && raw >= 0.5,
        }
    }

    /// Score and rank the wardrobe: weather-appropriate items first, then by
    /// seasonal score. The sort is stable so ties keep their input order.
    pub fn filter_and_rank(
        &self,
        items: &[WardrobeItem],
        weather: &WeatherContext,
    ) -> Vec<ScoredItem> {
        let mut scored: Vec<ScoredItem> = items
            .iter()
            .map(|item| self.score_item(item, weather))
            .collect();

        scored.sort_by(|a, b| {
            b.weather_appropriate
                .cmp(&a.weather_appropriate)
                .then_with(|| {
                    b.seasonal_score
                        .partial_cmp(&a.seasonal_score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        scored
    }

    /// Coarse category recommendations for the current conditions.
    pub fn category_advice(&self, weather: &WeatherContext) -> CategoryAdvice {
        let band = TemperatureBand::from_celsius(weather.temperature_celsius, &self.cfg.bands);

        let mut advice = match band {
            TemperatureBand::Hot => CategoryAdvice {
                required: vec![],
                preferred: str_vec(&["t-shirt", "tank top", "shorts", "dress", "sandals"]),
                avoid: str_vec(&["coat", "jacket", "sweater", "boots"]),
            },
            TemperatureBand::Warm => CategoryAdvice {
                required: vec![],
                preferred: str_vec(&["t-shirt", "light pants", "skirt", "sneakers"]),
                avoid: str_vec(&["heavy coat", "scarf"]),
            },
            TemperatureBand::Mild => CategoryAdvice {
                required: vec![],
                preferred: str_vec(&["long sleeve", "jeans", "light jacket"]),
                avoid: vec![],
            },
            TemperatureBand::Cool => CategoryAdvice {
                required: str_vec(&["jacket"]),
                preferred: str_vec(&["sweater", "jeans", "boots"]),
                avoid: str_vec(&["shorts", "sandals"]),
            },
            TemperatureBand::Cold => CategoryAdvice {
                required: str_vec(&["coat"]),
                preferred: str_vec(&["sweater", "scarf", "gloves", "boots"]),
                avoid: str_vec(&["shorts", "sandals"]),
            },
        };

        if weather.is_rainy {
            advice.required.push("waterproof jacket".to_string());
        }
        if weather.is_snowy {
            advice.required.push("winter boots".to_string());
        }
        if weather.is_wet() {
            for material in &self.cfg.wet_materials {
                advice.avoid.push(material.clone());
            }
        }

        advice
    }
}

fn str_vec(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
