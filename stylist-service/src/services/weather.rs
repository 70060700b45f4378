//! Weather provider abstraction and Open-Meteo implementation.

use crate::config::WeatherConfig;
use crate::models::{Season, WeatherContext};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use service_core::error::AppError;
use std::time::Duration;

/// External weather lookup for a coordinate pair.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherContext, AppError>;
}

/// Open-Meteo current-weather client.
pub struct OpenMeteoProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current_weather: OpenMeteoCurrent,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    temperature: f64,
    weathercode: i64,
}

impl OpenMeteoProvider {
    pub fn new(cfg: &WeatherConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        }
    }
}

// WMO weather interpretation codes.
fn is_rain_code(code: i64) -> bool {
    matches!(code, 51..=67 | 80..=82 | 95..=99)
}

fn is_snow_code(code: i64) -> bool {
    matches!(code, 71..=77 | 85..=86)
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherContext, AppError> {
        let url = format!(
            "{}/v1/forecast?latitude={}&longitude={}&current_weather=true",
            self.base_url, latitude, longitude
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::DependencyFailure(anyhow::anyhow!("weather request: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::DependencyFailure(anyhow::anyhow!("weather status: {}", e)))?;

        let body: OpenMeteoResponse = response
            .json()
            .await
            .map_err(|e| AppError::DependencyFailure(anyhow::anyhow!("weather payload: {}", e)))?;

        Ok(WeatherContext {
            temperature_celsius: body.current_weather.temperature,
            season_suggestion: Season::for_month(Utc::now().month(), latitude < 0.0),
            is_rainy: is_rain_code(body.current_weather.weathercode),
            is_snowy: is_snow_code(body.current_weather.weathercode),
        })
    }
}
