//! Wardrobe storage seam.

use crate::models::{NewWardrobeItem, WardrobeItem};
use async_trait::async_trait;
use service_core::error::AppError;
use uuid::Uuid;

/// Wardrobe persistence, backed by Postgres in production and by in-memory
/// fakes in tests.
#[async_trait]
pub trait WardrobeStore: Send + Sync {
    async fn list_items(&self, user_id: Uuid) -> Result<Vec<WardrobeItem>, AppError>;

    async fn count_items(&self, user_id: Uuid) -> Result<i64, AppError>;

    async fn add_item(
        &self,
        user_id: Uuid,
        item: &NewWardrobeItem,
    ) -> Result<WardrobeItem, AppError>;
}
