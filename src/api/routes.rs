use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::catalog::CatalogSnapshot;
use crate::engine;
use crate::observability::MetricsRegistry;

use super::request::CalculateRequest;
use super::response::{CalculateResponse, ErrorResponse, HealthResponse, ReadyResponse};

/// Shared application state.
pub struct AppState {
    /// Current catalog snapshot (updated via watch channel)
    pub snapshot_rx: watch::Receiver<Arc<CatalogSnapshot>>,

    pub metrics: Arc<MetricsRegistry>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,

    /// Result limit applied when the caller sends none
    pub default_limit: Option<usize>,

    /// Latency budget in milliseconds for the calculate endpoint
    pub latency_budget_ms: u64,
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/calculate", post(handle_calculate))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        // Browser calculator UIs call this service cross-origin
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Default spend date when the caller sends none.
///
/// Day-restricted rules follow the Hong Kong calendar, so the default
/// must roll over at midnight HKT (UTC+8), not at midnight UTC.
fn hk_today(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::hours(8)).date_naive()
}

/// Handle calculation requests.
async fn handle_calculate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CalculateRequest>,
) -> axum::response::Response {
    let start = Instant::now();

    let snapshot = state.snapshot_rx.borrow().clone();
    let today = hk_today(Utc::now());

    let ctx = match req.to_tx_context(&snapshot, today) {
        Ok(ctx) => ctx,
        Err(e) => {
            state.metrics.record_invalid_input();
            info!(query = %req.query, error = %e, "Rejected calculation request");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::invalid_input(e.to_string())),
            )
                .into_response();
        }
    };

    let limit = req.limit.or(state.default_limit);

    let results = match engine::calculate(&ctx, &snapshot, limit) {
        Ok(results) => results,
        Err(e) if e.is_retryable() => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::upstream(e.to_string())),
            )
                .into_response();
        }
        Err(e) => {
            state.metrics.record_invalid_input();
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::invalid_input(e.to_string())),
            )
                .into_response();
        }
    };

    let top_capped = results.first().is_some_and(|r| r.is_capped);
    state.metrics.record_calculation(results.len(), top_capped);
    state.metrics.record_latency(start);

    let elapsed = start.elapsed();
    if elapsed.as_millis() > state.latency_budget_ms as u128 {
        warn!(
            query = %req.query,
            latency_ms = elapsed.as_millis(),
            budget_ms = state.latency_budget_ms,
            "Calculation latency exceeded budget"
        );
    }

    info!(
        query = %req.query,
        results = results.len(),
        catalog_version = %snapshot.version,
        latency_ms = elapsed.as_millis(),
        "Calculation completed"
    );

    (
        StatusCode::OK,
        Json(CalculateResponse::new(snapshot.version.clone(), results)),
    )
        .into_response()
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot_rx.borrow();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        catalog_version: snapshot.version.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Readiness check endpoint.
async fn handle_ready(State(state): State<Arc<AppState>>) -> axum::response::Response {
    let snapshot = state.snapshot_rx.borrow();

    // Not ready until a catalog with cards has loaded
    if snapshot.card_count() == 0 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("No catalog loaded", "NOT_READY", true)),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            catalog_version: snapshot.version.clone(),
            cards: snapshot.card_count(),
            rules: snapshot.rule_count(),
        }),
    )
        .into_response()
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot_rx.borrow();

    let body = state.metrics.render(
        state.start_time.elapsed().as_secs(),
        snapshot.card_count(),
        snapshot.rule_count(),
    );

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        body,
    )
}
