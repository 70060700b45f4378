//! Test helper module for stylist-service integration tests.
//!
//! Spawns the real router on a random port with in-memory fakes behind the
//! collaborator seams, so quota and scoring behavior can be exercised
//! without Postgres or the live weather API.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stylist_service::config::{
    DatabaseConfig, QuotaConfig, ScoringConfig, StylistConfig, TierTable, WeatherConfig,
};
use stylist_service::models::{
    GenerationEvent, NewWardrobeItem, Season, Tier, WardrobeItem, WeatherContext,
};
use stylist_service::services::{
    GenerationEventStore, OutfitComposer, SubscriptionSource, TopPickComposer, WardrobeStore,
    WeatherProvider,
};
use stylist_service::startup::{router, AppState};
use tokio::net::TcpListener;
use uuid::Uuid;

/// In-memory generation event log.
#[derive(Default)]
pub struct MockEventStore {
    events: Mutex<Vec<GenerationEvent>>,
    failing: AtomicBool,
}

impl MockEventStore {
    /// Pre-load `count` events for the user, stamped now.
    pub fn seed(&self, user_id: Uuid, count: usize) {
        let mut events = self.events.lock().unwrap();
        for _ in 0..count {
            events.push(GenerationEvent {
                event_id: Uuid::new_v4(),
                user_id,
                source: "outfit_generation".to_string(),
                created_utc: Utc::now(),
            });
        }
    }

    /// Pre-load one event with an explicit timestamp.
    pub fn seed_at(&self, user_id: Uuid, created_utc: DateTime<Utc>) {
        self.events.lock().unwrap().push(GenerationEvent {
            event_id: Uuid::new_v4(),
            user_id,
            source: "outfit_generation".to_string(),
            created_utc,
        });
    }

    pub fn count(&self, user_id: Uuid) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .count()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl GenerationEventStore for MockEventStore {
    async fn count_events_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "event store unavailable"
            )));
        }
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id && e.created_utc >= start && e.created_utc < end)
            .count() as i64)
    }

    async fn record_event(
        &self,
        user_id: Uuid,
        source: &str,
    ) -> Result<GenerationEvent, AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "event store unavailable"
            )));
        }
        let event = GenerationEvent {
            event_id: Uuid::new_v4(),
            user_id,
            source: source.to_string(),
            created_utc: Utc::now(),
        };
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }
}

/// In-memory subscription directory. Unknown users are free tier.
#[derive(Default)]
pub struct MockSubscriptions {
    tiers: Mutex<HashMap<Uuid, Tier>>,
    failing: AtomicBool,
}

impl MockSubscriptions {
    pub fn set_tier(&self, user_id: Uuid, tier: Tier) {
        self.tiers.lock().unwrap().insert(user_id, tier);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubscriptionSource for MockSubscriptions {
    async fn subscription_tier(&self, user_id: Uuid) -> Result<Tier, AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DependencyFailure(anyhow::anyhow!(
                "subscription service unavailable"
            )));
        }
        Ok(self
            .tiers
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or(Tier::Free))
    }
}

/// In-memory wardrobe.
#[derive(Default)]
pub struct MockWardrobe {
    items: Mutex<Vec<WardrobeItem>>,
}

impl MockWardrobe {
    pub fn seed(&self, item: WardrobeItem) {
        self.items.lock().unwrap().push(item);
    }
}

#[async_trait]
impl WardrobeStore for MockWardrobe {
    async fn list_items(&self, user_id: Uuid) -> Result<Vec<WardrobeItem>, AppError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count_items(&self, user_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == user_id)
            .count() as i64)
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        item: &NewWardrobeItem,
    ) -> Result<WardrobeItem, AppError> {
        let stored = WardrobeItem {
            item_id: Uuid::new_v4(),
            user_id,
            name: item.name.clone(),
            category: item.category.clone(),
            seasons: item.seasons.clone(),
            formality_score: item.formality_score,
            created_utc: Utc::now(),
        };
        self.items.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
}

/// Scripted weather provider.
pub struct MockWeather {
    context: Mutex<WeatherContext>,
    failing: AtomicBool,
}

impl Default for MockWeather {
    fn default() -> Self {
        Self {
            context: Mutex::new(WeatherContext {
                temperature_celsius: 30.0,
                season_suggestion: Season::Summer,
                is_rainy: false,
                is_snowy: false,
            }),
            failing: AtomicBool::new(false),
        }
    }
}

impl MockWeather {
    pub fn set(&self, context: WeatherContext) {
        *self.context.lock().unwrap() = context;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl WeatherProvider for MockWeather {
    async fn current(&self, _latitude: f64, _longitude: f64) -> Result<WeatherContext, AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::DependencyFailure(anyhow::anyhow!(
                "weather provider unavailable"
            )));
        }
        Ok(*self.context.lock().unwrap())
    }
}

/// Build a wardrobe item for seeding.
pub fn item(
    user_id: Uuid,
    name: &str,
    category: Option<&str>,
    seasons: &[&str],
    formality_score: Option<i32>,
) -> WardrobeItem {
    WardrobeItem {
        item_id: Uuid::new_v4(),
        user_id,
        name: name.to_string(),
        category: category.map(str::to_string),
        seasons: if seasons.is_empty() {
            None
        } else {
            Some(seasons.iter().map(|s| s.to_string()).collect())
        },
        formality_score,
        created_utc: Utc::now(),
    }
}

/// Default test configuration: tier table and scoring constants as shipped,
/// quiet logging, random port.
pub fn test_config() -> StylistConfig {
    StylistConfig {
        common: CoreConfig {
            port: 0,
            log_level: "warn".to_string(),
            otlp_endpoint: None,
        },
        database: DatabaseConfig::default(),
        weather: WeatherConfig::default(),
        tiers: TierTable::default(),
        quota: QuotaConfig::default(),
        scoring: ScoringConfig::default(),
    }
}

/// Test application wrapper.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub events: Arc<MockEventStore>,
    pub subscriptions: Arc<MockSubscriptions>,
    pub wardrobe: Arc<MockWardrobe>,
    pub weather: Arc<MockWeather>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(test_config()).await
    }

    pub async fn spawn_with_config(config: StylistConfig) -> Self {
        // Required for the metrics endpoint test; idempotent.
        stylist_service::services::metrics::init_metrics();

        let events = Arc::new(MockEventStore::default());
        let subscriptions = Arc::new(MockSubscriptions::default());
        let wardrobe = Arc::new(MockWardrobe::default());
        let weather = Arc::new(MockWeather::default());
        let composer: Arc<dyn OutfitComposer> =
            Arc::new(TopPickComposer::new(config.scoring.bands));

        let state = AppState::new(
            config,
            events.clone(),
            subscriptions.clone(),
            wardrobe.clone(),
            weather.clone(),
            composer,
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().expect("listener has no address").port();
        let app = router(state).into_make_service_with_connect_info::<SocketAddr>();

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let address = format!("http://127.0.0.1:{}", port);
        let client = reqwest::Client::new();

        // Wait for the server to accept connections.
        for _ in 0..50 {
            if client
                .get(format!("{}/health", address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            events,
            subscriptions,
            wardrobe,
            weather,
        }
    }

    pub async fn post_generate(&self, user_id: Uuid) -> reqwest::Response {
        self.client
            .post(format!("{}/v1/outfits/generate", self.address))
            .header("x-user-id", user_id.to_string())
            .json(&serde_json::json!({ "latitude": 40.7, "longitude": -74.0 }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_wardrobe(
        &self,
        user_id: Uuid,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}/v1/wardrobe", self.address))
            .header("x-user-id", user_id.to_string())
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_scores(&self, user_id: Uuid) -> reqwest::Response {
        self.client
            .get(format!(
                "{}/v1/wardrobe/scores?latitude=40.7&longitude=-74.0",
                self.address
            ))
            .header("x-user-id", user_id.to_string())
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_usage(&self, user_id: Uuid) -> reqwest::Response {
        self.client
            .get(format!("{}/v1/usage", self.address))
            .header("x-user-id", user_id.to_string())
            .send()
            .await
            .expect("Failed to execute request")
    }
}
