//! Subscription tier model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Subscription tier. Closed set: quota magnitudes and feature flags are
/// looked up per variant, so an unknown tier cannot reach the quota layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Pro,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "pro" => Tier::Pro,
            _ => Tier::Free,
        }
    }

    pub fn is_pro(&self) -> bool {
        matches!(self, Tier::Pro)
    }
}

/// Per-user subscription state, owned by the billing system. The quota
/// service treats it as read-only input.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionRecord {
    pub user_id: Uuid,
    pub tier: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SubscriptionRecord {
    /// Effective tier at `now`; a lapsed pro subscription falls back to free.
    pub fn current_tier(&self, now: DateTime<Utc>) -> Tier {
        match Tier::from_string(&self.tier) {
            Tier::Pro if self.expires_at.map_or(true, |at| at > now) => Tier::Pro,
            _ => Tier::Free,
        }
    }
}
