//! Usage snapshot and generation event models.

use crate::models::tier::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A quota dimension independently gating the generate action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaDimension {
    MonthlyCredits,
    DailyCap,
}

impl QuotaDimension {
    /// Machine-readable rejection code for this dimension.
    pub fn code(&self) -> &'static str {
        match self {
            QuotaDimension::MonthlyCredits => "monthly_limit_reached",
            QuotaDimension::DailyCap => "daily_cap_reached",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaDimension::MonthlyCredits => "monthly_credits",
            QuotaDimension::DailyCap => "daily_cap",
        }
    }
}

/// Derived, never stored: usage is recomputed from persisted generation
/// events on every check, so there is no running counter to drift.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub dimension: QuotaDimension,
    pub used: i64,
    pub limit: i64,
    pub remaining: i64,
    pub resets_at: DateTime<Utc>,
    pub is_pro: bool,
}

impl UsageSnapshot {
    pub fn from_count(
        dimension: QuotaDimension,
        used: i64,
        limit: i64,
        resets_at: DateTime<Utc>,
        is_pro: bool,
    ) -> Self {
        Self {
            dimension,
            used,
            limit,
            remaining: (limit - used).max(0),
            resets_at,
            is_pro,
        }
    }

    /// Fail-open snapshot: a quota-check outage must never block the
    /// product's core action.
    pub fn open(
        dimension: QuotaDimension,
        limit: i64,
        resets_at: DateTime<Utc>,
        is_pro: bool,
    ) -> Self {
        Self::from_count(dimension, 0, limit, resets_at, is_pro)
    }

    pub fn allowed(&self) -> bool {
        self.remaining > 0
    }

    /// Tier the snapshot was computed against.
    pub fn tier(&self) -> Tier {
        if self.is_pro { Tier::Pro } else { Tier::Free }
    }
}

/// One persisted "generate a styled outfit" action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEvent {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub source: String,
    pub created_utc: DateTime<Utc>,
}
