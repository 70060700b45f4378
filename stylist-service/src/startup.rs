//! Application startup and lifecycle management.
//!
//! Wires the quota services, the scorer, and the external collaborator
//! seams into the router, and owns the window-store sweeper task.

use crate::config::StylistConfig;
use crate::handlers::{add_wardrobe_item, generate_outfit, get_usage, score_wardrobe};
use crate::middleware::{attach_rate_limit_key, generation_quota_middleware};
use crate::services::metrics::get_metrics;
use crate::services::{
    Database, GenerationEventStore, MonthlyQuotaService, OpenMeteoProvider, OutfitComposer,
    SubscriptionSource, TopPickComposer, WardrobeStore, WeatherItemScorer, WeatherProvider,
};
use axum::{
    Json, Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::{WindowLimit, WindowedQuotaStore, window_limit_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state. External collaborators sit behind trait
/// objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<StylistConfig>,
    pub quota: Arc<MonthlyQuotaService>,
    pub events: Arc<dyn GenerationEventStore>,
    pub subscriptions: Arc<dyn SubscriptionSource>,
    pub wardrobe: Arc<dyn WardrobeStore>,
    pub weather: Arc<dyn WeatherProvider>,
    pub composer: Arc<dyn OutfitComposer>,
    pub scorer: Arc<WeatherItemScorer>,
    pub window_store: Arc<WindowedQuotaStore>,
}

impl AppState {
    pub fn new(
        config: StylistConfig,
        events: Arc<dyn GenerationEventStore>,
        subscriptions: Arc<dyn SubscriptionSource>,
        wardrobe: Arc<dyn WardrobeStore>,
        weather: Arc<dyn WeatherProvider>,
        composer: Arc<dyn OutfitComposer>,
    ) -> Self {
        let config = Arc::new(config);
        let quota = Arc::new(MonthlyQuotaService::new(
            events.clone(),
            subscriptions.clone(),
            config.tiers.clone(),
        ));
        let scorer = Arc::new(WeatherItemScorer::new(config.scoring.clone()));

        Self {
            config,
            quota,
            events,
            subscriptions,
            wardrobe,
            weather,
            composer,
            scorer,
            window_store: Arc::new(WindowedQuotaStore::new()),
        }
    }
}

/// Liveness probe.
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "stylist-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness probe.
async fn readiness_check() -> StatusCode {
    StatusCode::OK
}

/// Prometheus metrics in text format.
async fn metrics_handler() -> impl IntoResponse {
    (StatusCode::OK, get_metrics())
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    let upload_limit = WindowLimit {
        store: state.window_store.clone(),
        scope: "upload",
        window: Duration::from_secs(state.config.quota.upload_window_seconds),
        max: state.config.quota.upload_max_per_window,
    };

    let generate = Router::new()
        .route("/v1/outfits/generate", post(generate_outfit))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            generation_quota_middleware,
        ));

    // attach_rate_limit_key must run outside the window limit so uploads
    // are throttled per user, not per IP.
    let uploads = Router::new()
        .route("/v1/wardrobe", post(add_wardrobe_item))
        .route_layer(axum_middleware::from_fn_with_state(
            upload_limit,
            window_limit_middleware,
        ))
        .route_layer(axum_middleware::from_fn(attach_rate_limit_key));

    Router::new()
        .merge(generate)
        .merge(uploads)
        .route("/v1/wardrobe/scores", get(score_wardrobe))
        .route("/v1/usage", get(get_usage))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: StylistConfig) -> Result<Self, AppError> {
        let db = Database::new(&config.database).await?;
        db.run_migrations().await?;

        let weather: Arc<dyn WeatherProvider> = Arc::new(OpenMeteoProvider::new(&config.weather));
        let composer: Arc<dyn OutfitComposer> =
            Arc::new(TopPickComposer::new(config.scoring.bands));

        let port = config.common.port;
        let state = AppState::new(
            config,
            Arc::new(db.clone()),
            Arc::new(db.clone()),
            Arc::new(db),
            weather,
            composer,
        );

        // Port 0 binds a random port for testing.
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a handle to the application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let shutdown = CancellationToken::new();
        let sweeper = self.state.window_store.spawn_sweeper(
            Duration::from_secs(self.state.config.quota.sweep_interval_seconds),
            shutdown.clone(),
        );

        let app = router(self.state).into_make_service_with_connect_info::<SocketAddr>();
        let result = axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        shutdown.cancel();
        let _ = sweeper.await;

        result
    }
}
