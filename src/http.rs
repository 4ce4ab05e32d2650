use crate::analyze::analyze_item;
use crate::scan::{resolve_request, scan_marketplace};
use crate::types::*;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
pub struct ScanQuery {
    #[serde(default)]
    pub location: Option<String>,
    /// Kept as text so a malformed value falls back to the default instead of
    /// rejecting the request.
    #[serde(default)]
    pub max_price: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/scan", get(scan_handler))
        .route("/analyze", post(analyze_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "resale-scout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn scan_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScanQuery>,
) -> Json<ScanResponse> {
    let request = resolve_request(query.location.as_deref(), query.max_price.as_deref());
    Json(scan_marketplace(&state.scanner, &request).await)
}

async fn analyze_handler(body: Bytes) -> Result<Json<ScoreResult>, (StatusCode, Json<ErrorResponse>)> {
    let payload = serde_json::from_slice::<serde_json::Value>(&body).unwrap_or_default();
    analyze_item(&payload).map(Json).map_err(|e| {
        warn!("Rejected analyze request: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })
}
