//! HTTP boundary: webhook ingestion and dashboard reads.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::dashboard::CachedDashboard;
use crate::error::IngestError;
use crate::ingest::SignalIngestor;

/// Shared handles for all requests, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<SignalIngestor>,
    pub dashboard: Arc<CachedDashboard>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/webhook", post(webhook_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(bind_addr: &str, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind_addr).await?;

    info!("✓ Signal hub listening on http://{}", bind_addr);
    info!("  • Webhook:   POST http://{}/api/webhook", bind_addr);
    info!("  • Dashboard: GET  http://{}/api/dashboard", bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Accepts any JSON body; shape checks belong to the classifier
pub async fn webhook_handler(State(state): State<AppState>, body: Option<Json<Value>>) -> Response {
    let payload = body.map(|Json(v)| v).unwrap_or(Value::Null);

    match state.ingestor.ingest(&payload).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Signal processed successfully",
                "data": receipt,
            })),
        )
            .into_response(),
        Err(IngestError::Validation(e)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(IngestError::Storage(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error",
                "message": "Failed to process signal",
            })),
        )
            .into_response(),
    }
}

pub async fn dashboard_handler(State(state): State<AppState>) -> Response {
    match state.dashboard.read().await {
        Ok(read) => {
            let mut response = (StatusCode::OK, Json(read.view)).into_response();
            response
                .headers_mut()
                .insert("x-cache", HeaderValue::from_static(read.cache.as_header()));
            response
        }
        Err(e) => {
            error!("Error getting dashboard data: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to retrieve dashboard data",
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::{CacheConfig, DashboardConfig};
    use crate::dashboard::DashboardAggregator;
    use crate::error_log::TracingErrorLogger;
    use crate::store::MemorySignalStore;

    fn state() -> (Arc<MemorySignalStore>, AppState) {
        let store = Arc::new(MemorySignalStore::new());
        let errors = Arc::new(TracingErrorLogger);
        let aggregator = DashboardAggregator::new(store.clone(), &DashboardConfig::default());
        let dashboard = CachedDashboard::new(
            aggregator,
            Arc::new(MemoryCache::new()),
            errors.clone(),
            &CacheConfig::default(),
        );
        let state = AppState {
            ingestor: Arc::new(SignalIngestor::new(store.clone(), errors)),
            dashboard: Arc::new(dashboard),
        };
        (store, state)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_webhook_success() {
        let (_, state) = state();

        let response = webhook_handler(
            State(state),
            Some(Json(json!({"scrip": "tcs", "reason": "Bullish breakout"}))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["symbol"], "TCS");
        assert_eq!(body["data"]["indicatorType"], "Indicator1");
    }

    #[tokio::test]
    async fn test_webhook_validation_and_storage_errors() {
        let (store, state) = state();

        let response = webhook_handler(State(state.clone()), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = webhook_handler(State(state.clone()), Some(Json(json!({"scrip": "tcs"})))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "missing reason");

        store.set_failing(true);
        let response =
            webhook_handler(State(state), Some(Json(json!({"scrip": "tcs", "reason": "x"})))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_dashboard_cache_header() {
        let (_, state) = state();

        let first = dashboard_handler(State(state.clone())).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()["x-cache"], "MISS");

        let second = dashboard_handler(State(state)).await;
        assert_eq!(second.headers()["x-cache"], "HIT");
        let body = body_json(second).await;
        assert_eq!(body["kpis"]["totalSignals"], 0);
    }

    #[tokio::test]
    async fn test_dashboard_storage_error() {
        let (store, state) = state();
        store.set_failing(true);

        let response = dashboard_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Failed to retrieve dashboard data");
    }
}
