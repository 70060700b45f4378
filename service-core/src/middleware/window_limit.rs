//! Fixed-window request counting with lazy expiry.
//!
//! Counters live in a process-wide map injected at startup; restart clears
//! every window, and horizontally scaled instances each count independently.
//! Only the database-backed monthly quota is globally consistent.

use crate::error::{
    AppError, QuotaRejection, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET,
};
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// One key's counter for the current window.
#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    window_reset_at: Instant,
}

/// Outcome of a combined check-and-increment.
#[derive(Debug, Clone, Copy)]
pub struct WindowCheck {
    pub allowed: bool,
    /// Hits counted against the window so far, including this one. Can
    /// exceed the maximum: denied attempts are counted too.
    pub used: u32,
    pub remaining: u32,
    pub reset_in: Duration,
}

/// In-process counter keyed by an arbitrary string over a fixed window.
///
/// `check` is a combined check-and-increment, not a pure read. A key's
/// read-modify-write runs under the map entry's exclusive guard, so two
/// concurrent checks for the same key cannot lose an update.
#[derive(Debug, Default)]
pub struct WindowedQuotaStore {
    entries: DashMap<String, WindowEntry>,
}

impl WindowedQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a hit against `key` and report whether it stayed within `max`.
    pub fn check(&self, key: &str, window: Duration, max: u32) -> WindowCheck {
        self.check_at(Instant::now(), key, window, max)
    }

    /// `check` against an explicit clock reading.
    pub fn check_at(&self, now: Instant, key: &str, window: Duration, max: u32) -> WindowCheck {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(WindowEntry {
                count: 0,
                window_reset_at: now + window,
            });

        // An elapsed window self-heals on next access; the sweeper is only
        // a memory bound for keys that are never revisited.
        if now >= entry.window_reset_at {
            *entry = WindowEntry {
                count: 0,
                window_reset_at: now + window,
            };
        }

        entry.count += 1;

        WindowCheck {
            allowed: entry.count <= max,
            used: entry.count,
            remaining: max.saturating_sub(entry.count),
            reset_in: entry.window_reset_at.saturating_duration_since(now),
        }
    }

    /// Drop every entry whose window has already elapsed. Returns how many
    /// entries were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.window_reset_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run `sweep` on a fixed cadence until `shutdown` fires.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = store.sweep();
                        if removed > 0 {
                            tracing::debug!(removed, "swept expired rate-limit windows");
                        }
                    }
                }
            }
        })
    }
}

/// Request extension identifying the throttled subject, inserted by the
/// service's auth middleware. Falls back to the client IP when absent.
#[derive(Debug, Clone)]
pub struct RateLimitKey(pub String);

/// Per-route window limit configuration.
#[derive(Clone)]
pub struct WindowLimit {
    pub store: Arc<WindowedQuotaStore>,
    /// Key prefix naming the throttled action, e.g. `upload`.
    pub scope: &'static str,
    pub window: Duration,
    pub max: u32,
}

fn client_key(request: &Request) -> Option<String> {
    if let Some(RateLimitKey(key)) = request.extensions().get::<RateLimitKey>() {
        return Some(key.clone());
    }

    let forwarded_ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<std::net::IpAddr>().ok());

    if let Some(ip) = forwarded_ip {
        return Some(ip.to_string());
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<SocketAddr>>()
        .map(|axum::extract::ConnectInfo(addr)| addr.ip().to_string())
}

/// Middleware gating a route behind a fixed-window counter.
pub async fn window_limit_middleware(
    State(limit): State<WindowLimit>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(key) = client_key(&request) else {
        tracing::warn!(scope = limit.scope, "could not determine rate-limit key");
        return Ok(next.run(request).await);
    };

    let check = limit
        .store
        .check(&format!("{}:{}", limit.scope, key), limit.window, limit.max);

    if !check.allowed {
        let reset_secs = check.reset_in.as_secs().max(1);
        return Err(AppError::QuotaExceeded(Box::new(QuotaRejection {
            code: "rate_limited".to_string(),
            message: format!(
                "Too many {} requests. Try again in {} seconds.",
                limit.scope, reset_secs
            ),
            used: i64::from(check.used),
            limit: i64::from(limit.max),
            remaining: 0,
            resets_at: Utc::now() + chrono::Duration::seconds(reset_secs as i64),
            upgrade_url: None,
        })));
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, limit.max.into());
    headers.insert(X_RATELIMIT_REMAINING, check.remaining.into());
    if let Ok(reset) = HeaderValue::from_str(&check.reset_in.as_secs().to_string()) {
        headers.insert(X_RATELIMIT_RESET, reset);
    }
    Ok(response)
}
