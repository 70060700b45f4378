//! Weather context and derived classifications.

use crate::config::TemperatureBands;
use serde::{Deserialize, Serialize};

/// Season implied by the current weather, or declared on an item tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
    All,
}

impl Season {
    /// Parse an item's season tag. Unrecognized tags are not an error; the
    /// scorer assigns them a configured default weight.
    pub fn parse(tag: &str) -> Option<Season> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "spring" => Some(Season::Spring),
            "summer" => Some(Season::Summer),
            "fall" => Some(Season::Fall),
            "winter" => Some(Season::Winter),
            "all" => Some(Season::All),
            _ => None,
        }
    }

    /// Calendar season for a month (1-12), flipped for the southern
    /// hemisphere.
    pub fn for_month(month: u32, southern_hemisphere: bool) -> Season {
        let month = if southern_hemisphere {
            (month + 5) % 12 + 1
        } else {
            month
        };
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
            Season::All => "all",
        }
    }
}

/// Current weather at the user's location, as reported by the external
/// weather provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherContext {
    pub temperature_celsius: f64,
    pub season_suggestion: Season,
    pub is_rainy: bool,
    pub is_snowy: bool,
}

impl WeatherContext {
    pub fn is_wet(&self) -> bool {
        self.is_rainy || self.is_snowy
    }
}

/// Temperature bucket driving the admissible formality range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBand {
    Hot,
    Warm,
    Mild,
    Cool,
    Cold,
}

impl TemperatureBand {
    pub fn from_celsius(temperature: f64, bands: &TemperatureBands) -> Self {
        if temperature >= bands.hot_min {
            TemperatureBand::Hot
        } else if temperature >= bands.warm_min {
            TemperatureBand::Warm
        } else if temperature >= bands.mild_min {
            TemperatureBand::Mild
        } else if temperature >= bands.cool_min {
            TemperatureBand::Cool
        } else {
            TemperatureBand::Cold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureBand::Hot => "hot",
            TemperatureBand::Warm => "warm",
            TemperatureBand::Mild => "mild",
            TemperatureBand::Cool => "cool",
            TemperatureBand::Cold => "cold",
        }
    }
}

/// Advisory category lists for downstream UI and generation. Carries no
/// numeric score.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryAdvice {
    pub required: Vec<String>,
    pub preferred: Vec<String>,
    pub avoid: Vec<String>,
}
