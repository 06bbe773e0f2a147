// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
//   GET /                              liveness text
//   GET /api/v1/health                 JSON status
//   GET /api/v1/analyze/:token         per-symbol reports
//         ?strategy=scored|paired      override the configured fusion policy
//
// CORS is configured permissively; the service exposes read-only data.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app_state::AppState;
use crate::pipeline::{evaluate_symbol, resolve_symbols, SymbolReport};
use crate::signals::FusionStrategyKind;

pub const LIVENESS_TEXT: &str = "Bot is running!";

// =============================================================================
// Router construction
// =============================================================================

/// Build the REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(liveness))
        .route("/api/v1/health", get(health))
        .route("/api/v1/analyze/:token", get(analyze_token))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Liveness / health
// =============================================================================

async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Analysis
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    strategy: Option<String>,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    query: String,
    strategy: FusionStrategyKind,
    reports: Vec<SymbolReport>,
}

async fn analyze_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Query(params): Query<AnalyzeParams>,
) -> impl IntoResponse {
    let mut analysis = state.config.analysis.clone();
    if let Some(raw) = params.strategy.as_deref() {
        match raw.parse::<FusionStrategyKind>() {
            Ok(kind) => analysis.fusion_strategy = kind,
            Err(e) => {
                return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": e })))
                    .into_response();
            }
        }
    }

    let symbols = resolve_symbols(&token, &state.config.quote_asset);
    if symbols.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "empty symbol" })),
        )
            .into_response();
    }

    info!(token = %token, symbols = ?symbols, strategy = %analysis.fusion_strategy, "analyze request");

    let mut reports = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        reports.push(evaluate_symbol(&state, symbol, &analysis).await);
    }

    Json(AnalyzeResponse {
        query: token.trim().to_uppercase(),
        strategy: analysis.fusion_strategy,
        reports,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::mock_state;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn liveness_text() {
        let app = router(Arc::new(mock_state().await));
        let (status, body) = get_body(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Bot is running!");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = router(Arc::new(mock_state().await));
        let (status, body) = get_body(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["server_time"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn unknown_strategy_is_bad_request() {
        let app = router(Arc::new(mock_state().await));
        let (status, body) = get_body(app, "/api/v1/analyze/btc?strategy=weighted").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("unknown fusion strategy"));
    }

    #[tokio::test]
    async fn blank_token_is_bad_request() {
        let app = router(Arc::new(mock_state().await));
        let (status, _) = get_body(app, "/api/v1/analyze/%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn eth_returns_two_reports() {
        let app = router(Arc::new(mock_state().await));
        let (status, body) = get_body(app, "/api/v1/analyze/eth?strategy=paired").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["query"], "ETH");
        assert_eq!(json["strategy"], "paired");
        let reports = json["reports"].as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["symbol"], "ETHUSDT");
        assert_eq!(reports[1]["symbol"], "ETHBTC");
        assert_eq!(reports[1]["status"], "price_only");
    }

    #[tokio::test]
    async fn btc_report_carries_recommendation() {
        let app = router(Arc::new(mock_state().await));
        let (status, body) = get_body(app, "/api/v1/analyze/btc").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let report = &json["reports"][0];
        assert_eq!(report["status"], "ok");
        assert_eq!(report["recommendation"]["fusion"]["strategy"], "scored");
        assert_eq!(report["recommendation"]["trend"]["cross"], "GoldenCross");
    }
}
