//! Tiered, time-windowed generation quotas.
//!
//! Checks are pure reads: usage is always recomputed by counting persisted
//! generation events over the current window, never cached as a running
//! counter. The increment happens implicitly when a successful generation
//! persists its event. Two concurrent requests from the same user can both
//! read `used < limit` before either event lands, so the monthly limit can
//! be overrun by the number of in-flight requests. That bounded overrun is
//! an accepted consistency relaxation; a stricter design would need a
//! single-writer reserve-or-reject transaction per user and month.

use crate::config::TierTable;
use crate::models::{GenerationEvent, QuotaDimension, Tier, UsageSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use service_core::error::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Persisted generation events, the source of truth for usage.
#[async_trait]
pub trait GenerationEventStore: Send + Sync {
    /// Count a user's generation events with timestamp in `[start, end)`.
    async fn count_events_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    /// Persist one generation event. Called by the generation pipeline after
    /// a successful generation, not by the quota check.
    async fn record_event(&self, user_id: Uuid, source: &str)
        -> Result<GenerationEvent, AppError>;
}

/// External subscription-status lookup.
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    async fn subscription_tier(&self, user_id: Uuid) -> Result<Tier, AppError>;
}

/// First instants of the current and next calendar month, UTC.
pub fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let date = now.date_naive();
    let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .expect("first day of month is always valid");
    let end = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
    .expect("first day of month is always valid");

    (
        Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).expect("midnight is always valid")),
        Utc.from_utc_datetime(&end.and_hms_opt(0, 0, 0).expect("midnight is always valid")),
    )
}

/// First instants of the current and next UTC day.
pub fn day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(
        &now.date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid"),
    );
    (start, start + Duration::days(1))
}

/// Derives a user's effective limits from the tier table and computes usage
/// from the event store.
pub struct MonthlyQuotaService {
    events: Arc<dyn GenerationEventStore>,
    subscriptions: Arc<dyn SubscriptionSource>,
    tiers: TierTable,
}

impl MonthlyQuotaService {
    pub fn new(
        events: Arc<dyn GenerationEventStore>,
        subscriptions: Arc<dyn SubscriptionSource>,
        tiers: TierTable,
    ) -> Self {
        Self {
            events,
            subscriptions,
            tiers,
        }
    }

    /// Monthly credit check. Fails open on any dependency error: the user is
    /// allowed through with a full window rather than blocked by an outage.
    pub async fn check_monthly_limit(&self, user_id: Uuid) -> UsageSnapshot {
        let (start, end) = month_bounds(Utc::now());
        self.check_dimension(user_id, QuotaDimension::MonthlyCredits, start, end)
            .await
    }

    /// Daily cap check over the current UTC day. Same fail-open policy as
    /// the monthly check.
    pub async fn check_daily_cap(&self, user_id: Uuid) -> UsageSnapshot {
        let (start, end) = day_bounds(Utc::now());
        self.check_dimension(user_id, QuotaDimension::DailyCap, start, end)
            .await
    }

    async fn check_dimension(
        &self,
        user_id: Uuid,
        dimension: QuotaDimension,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> UsageSnapshot {
        let tier = match self.subscriptions.subscription_tier(user_id).await {
            Ok(tier) => tier,
            Err(error) => {
                tracing::warn!(
                    %user_id,
                    dimension = dimension.as_str(),
                    %error,
                    "subscription lookup failed, failing open"
                );
                let limit = self.limit_for(Tier::Free, dimension);
                return UsageSnapshot::open(dimension, limit, end, false);
            }
        };

        let limit = self.limit_for(tier, dimension);

        match self.events.count_events_between(user_id, start, end).await {
            Ok(used) => UsageSnapshot::from_count(dimension, used, limit, end, tier.is_pro()),
            Err(error) => {
                tracing::warn!(
                    %user_id,
                    dimension = dimension.as_str(),
                    %error,
                    "event store unavailable, failing open"
                );
                UsageSnapshot::open(dimension, limit, end, tier.is_pro())
            }
        }
    }

    fn limit_for(&self, tier: Tier, dimension: QuotaDimension) -> i64 {
        let limits = self.tiers.limits(tier);
        match dimension {
            QuotaDimension::MonthlyCredits => limits.monthly_generation_credits,
            QuotaDimension::DailyCap => limits.daily_generation_cap,
        }
    }
}
