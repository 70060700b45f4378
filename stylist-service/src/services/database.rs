//! Database service for stylist-service.

use crate::config::DatabaseConfig;
use crate::models::{GenerationEvent, NewWardrobeItem, SubscriptionRecord, Tier, WardrobeItem};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::quota::{GenerationEventStore, SubscriptionSource};
use crate::services::wardrobe::WardrobeStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(cfg), fields(service = "stylist-service"))]
    pub async fn new(cfg: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            max_connections = cfg.max_connections,
            min_connections = cfg.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .min_connections(cfg.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(&cfg.url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["health_check"])
            .start_timer();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        timer.observe_duration();
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Fetch a user's subscription record, if any.
    #[instrument(skip(self))]
    pub async fn get_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SubscriptionRecord>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_subscription"])
            .start_timer();

        let record = sqlx::query_as::<_, SubscriptionRecord>(
            "SELECT user_id, tier, expires_at FROM subscriptions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch subscription: {}", e))
        })?;

        timer.observe_duration();
        Ok(record)
    }

    /// Count a user's generation events in `[start, end)`.
    #[instrument(skip(self))]
    pub async fn count_generation_events(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["count_generation_events"])
            .start_timer();

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM generation_events
            WHERE user_id = $1 AND created_utc >= $2 AND created_utc < $3
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count events: {}", e)))?;

        timer.observe_duration();
        Ok(count)
    }

    /// Persist a generation event.
    #[instrument(skip(self))]
    pub async fn insert_generation_event(
        &self,
        user_id: Uuid,
        source: &str,
    ) -> Result<GenerationEvent, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_generation_event"])
            .start_timer();

        let event = sqlx::query_as::<_, GenerationEvent>(
            r#"
            INSERT INTO generation_events (event_id, user_id, source)
            VALUES ($1, $2, $3)
            RETURNING event_id, user_id, source, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(source)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to record event: {}", e)))?;

        timer.observe_duration();
        info!(event_id = %event.event_id, user_id = %user_id, "Generation event recorded");
        Ok(event)
    }

    /// List a user's wardrobe, oldest first.
    #[instrument(skip(self))]
    pub async fn list_wardrobe_items(&self, user_id: Uuid) -> Result<Vec<WardrobeItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_wardrobe_items"])
            .start_timer();

        let items = sqlx::query_as::<_, WardrobeItem>(
            r#"
            SELECT item_id, user_id, name, category, seasons, formality_score, created_utc
            FROM wardrobe_items
            WHERE user_id = $1
            ORDER BY created_utc
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list wardrobe: {}", e)))?;

        timer.observe_duration();
        Ok(items)
    }

    /// Count a user's wardrobe items.
    #[instrument(skip(self))]
    pub async fn count_wardrobe_items(&self, user_id: Uuid) -> Result<i64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["count_wardrobe_items"])
            .start_timer();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM wardrobe_items WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to count wardrobe: {}", e))
                })?;

        timer.observe_duration();
        Ok(count)
    }

    /// Insert a wardrobe item.
    #[instrument(skip(self, item))]
    pub async fn insert_wardrobe_item(
        &self,
        user_id: Uuid,
        item: &NewWardrobeItem,
    ) -> Result<WardrobeItem, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_wardrobe_item"])
            .start_timer();

        let created = sqlx::query_as::<_, WardrobeItem>(
            r#"
            INSERT INTO wardrobe_items (item_id, user_id, name, category, seasons, formality_score)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING item_id, user_id, name, category, seasons, formality_score, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(&item.seasons)
        .bind(item.formality_score)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert item: {}", e)))?;

        timer.observe_duration();
        info!(item_id = %created.item_id, user_id = %user_id, "Wardrobe item added");
        Ok(created)
    }
}

#[async_trait]
impl GenerationEventStore for Database {
    async fn count_events_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        self.count_generation_events(user_id, start, end).await
    }

    async fn record_event(
        &self,
        user_id: Uuid,
        source: &str,
    ) -> Result<GenerationEvent, AppError> {
        self.insert_generation_event(user_id, source).await
    }
}

#[async_trait]
impl SubscriptionSource for Database {
    async fn subscription_tier(&self, user_id: Uuid) -> Result<Tier, AppError> {
        let record = self.get_subscription(user_id).await?;
        Ok(record.map_or(Tier::Free, |r| r.current_tier(Utc::now())))
    }
}

#[async_trait]
impl WardrobeStore for Database {
    async fn list_items(&self, user_id: Uuid) -> Result<Vec<WardrobeItem>, AppError> {
        self.list_wardrobe_items(user_id).await
    }

    async fn count_items(&self, user_id: Uuid) -> Result<i64, AppError> {
        self.count_wardrobe_items(user_id).await
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        item: &NewWardrobeItem,
    ) -> Result<WardrobeItem, AppError> {
        self.insert_wardrobe_item(user_id, item).await
    }
}
