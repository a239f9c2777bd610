//! HTTP Endpoints
//!
//! REST API for training site models and resolving queries.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Json, Path, Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use site_assistant_core::{ResolutionResult, RoutingIntent, SiteId, SiteMetadata, SiteRecord};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::track_metrics;
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        .route("/train", post(train))
        .route("/process", post(process))
        .route("/sites/:site_id", get(get_site))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(middleware::from_fn_with_state(timeout, request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// Disabled means permissive. Enabled with no valid origins falls back to
/// localhost:3000.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        return cors.allow_origin(HeaderValue::from_static("http://localhost:3000"));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    cors.allow_origin(parsed_origins)
}

/// Answer `408 {error}` when a handler runs past `limit`
///
/// Dropping the handler future cancels it; work that must finish once
/// started is spawned by the handler itself.
async fn request_timeout(State(limit): State<Duration>, request: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(timeout_secs = limit.as_secs_f64(), "Request timed out");
            ServerError::Timeout("request timed out".to_string()).into_response()
        }
    }
}

fn parse_site_id(raw: &str) -> Result<SiteId, ServerError> {
    SiteId::parse(raw).map_err(ServerError::from)
}

/// Train request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainRequest {
    site_id: Option<String>,
    #[serde(default, deserialize_with = "site_assistant_core::lenient::list")]
    routing_intents: Vec<RoutingIntent>,
    #[serde(default, deserialize_with = "site_assistant_core::lenient::or_default")]
    site_metadata: SiteMetadata,
}

/// Store the site record and train its model
async fn train(
    State(state): State<AppState>,
    body: Result<Json<TrainRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Json(request) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let raw_id = request
        .site_id
        .ok_or_else(|| ServerError::BadRequest("siteId is required".to_string()))?;
    let site_id = parse_site_id(&raw_id)?;

    let record = SiteRecord {
        routing_intents: request.routing_intents,
        site_metadata: request.site_metadata,
    };

    tracing::info!(
        site_id = %site_id,
        pages = record.site_metadata.pages.len(),
        routing_intents = record.routing_intents.len(),
        "Training requested"
    );

    // runs to completion even if the request times out
    let assistant = Arc::clone(&state.assistant);
    let outcome = tokio::spawn(async move { assistant.train(&site_id, &record).await })
        .await
        .map_err(|e| ServerError::Internal(format!("Training task failed: {}", e)))??;

    Ok(Json(outcome))
}

/// Process request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest {
    site_id: Option<String>,
    query: Option<String>,
}

/// Resolve a query against a site's model
async fn process(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ResolutionResult>, ServerError> {
    let missing = || ServerError::BadRequest("siteId and query are required".to_string());

    let Json(request) = body.map_err(|_| missing())?;
    let (Some(raw_id), Some(query)) = (request.site_id, request.query) else {
        return Err(missing());
    };
    if raw_id.is_empty() || query.trim().is_empty() {
        return Err(missing());
    }

    let site_id = parse_site_id(&raw_id)?;
    let result = state.assistant.resolve(&site_id, &query).await?;

    Ok(Json(result))
}

/// Stored record for one site
async fn get_site(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<SiteRecord>, ServerError> {
    let site_id = parse_site_id(&raw_id)?;

    state
        .assistant
        .site(&site_id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("Site '{}' not found", site_id)))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "knowledgeLoaded": state.assistant.knowledge().is_loaded(),
    }))
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_builds_for_all_modes() {
        let _ = build_cors_layer(&[], false);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["https://portal.example.com".to_string()], true);
        let _ = build_cors_layer(&["not a header\n".to_string()], true);
    }

    #[tokio::test]
    async fn test_slow_request_times_out_with_json_error() {
        use axum::body::{to_bytes, Body};
        use tower::ServiceExt;

        let app = Router::new()
            .route("/slow", get(|| std::future::pending::<()>()))
            .route("/fast", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                Duration::from_millis(20),
                request_timeout,
            ));

        let request = axum::http::Request::builder()
            .uri("/slow")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "request timed out" }));

        let request = axum::http::Request::builder()
            .uri("/fast")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_invalid_site_id_is_bad_request() {
        let err = parse_site_id("../etc").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
