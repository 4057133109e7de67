//! # Rosetta HTTP API
//!
//! Builds the axum router that exposes the construction endpoints. Every
//! endpoint takes a JSON body and returns either the response object with
//! `200 OK` or a Rosetta error object with `500 Internal Server Error`, as
//! Rosetta clients expect.
//!
//! ## Endpoints
//!
//! | Method | Path                       | Description                          |
//! |--------|----------------------------|--------------------------------------|
//! | GET    | `/health`                  | Liveness check                       |
//! | POST   | `/construction/preprocess` | Operations to metadata options       |
//! | POST   | `/construction/metadata`   | Account and chain state for signing  |
//! | POST   | `/construction/payloads`   | Unsigned tx and signing payloads     |
//! | POST   | `/construction/derive`     | Address of a public key              |
//! | POST   | `/construction/combine`    | Not implemented                      |
//! | POST   | `/construction/hash`       | Not implemented                      |
//! | POST   | `/construction/parse`      | Not implemented                      |
//! | POST   | `/construction/submit`     | Not implemented                      |

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rosetta_protocol::construction::{ConstructionApi, ConstructionError};
use rosetta_protocol::types::{
    ConstructionCombineRequest, ConstructionDeriveRequest, ConstructionHashRequest,
    ConstructionMetadataRequest, ConstructionParseRequest, ConstructionPayloadsRequest,
    ConstructionPreprocessRequest, ConstructionSubmitRequest, RosettaError,
};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone, everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The construction pipeline.
    pub api: Arc<dyn ConstructionApi>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
    /// The server's reported version string.
    pub version: String,
    /// When the server started, for `/health`.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(api: Arc<dyn ConstructionApi>, metrics: SharedMetrics) -> Self {
        Self {
            api,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Creates the API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/construction/preprocess", post(preprocess_handler))
        .route("/construction/metadata", post(metadata_handler))
        .route("/construction/payloads", post(payloads_handler))
        .route("/construction/derive", post(derive_handler))
        .route("/construction/combine", post(combine_handler))
        .route("/construction/hash", post(hash_handler))
        .route("/construction/parse", post(parse_handler))
        .route("/construction/submit", post(submit_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Unwraps a JSON body, turning a rejection into a Rosetta error so that
/// clients get the same error envelope for malformed bodies.
fn decode<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RosettaError> {
    body.map(|Json(request)| request).map_err(|rejection| {
        RosettaError::from(ConstructionError::Interpreting(rejection.body_text()))
    })
}

/// Records metrics for one request and renders its outcome.
fn respond<T: Serialize>(
    state: &AppState,
    endpoint: &'static str,
    started: Instant,
    result: Result<T, RosettaError>,
) -> Response {
    let error_code = result.as_ref().err().map(|e| e.code);
    state.metrics.observe(endpoint, started.elapsed(), error_code);

    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, Json(err)).into_response(),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = Utc::now().signed_duration_since(state.started_at);
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        started_at: state.started_at,
        uptime_seconds: uptime.num_seconds(),
    })
}

async fn preprocess_handler(
    State(state): State<AppState>,
    body: Result<Json<ConstructionPreprocessRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result = match decode(body) {
        Ok(request) => state.api.preprocess(request).await,
        Err(e) => Err(e),
    };
    respond(&state, "preprocess", started, result)
}

async fn metadata_handler(
    State(state): State<AppState>,
    body: Result<Json<ConstructionMetadataRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result = match decode(body) {
        Ok(request) => state.api.metadata(request).await,
        Err(e) => Err(e),
    };
    respond(&state, "metadata", started, result)
}

async fn payloads_handler(
    State(state): State<AppState>,
    body: Result<Json<ConstructionPayloadsRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result = match decode(body) {
        Ok(request) => state.api.payloads(request).await,
        Err(e) => Err(e),
    };
    respond(&state, "payloads", started, result)
}

async fn derive_handler(
    State(state): State<AppState>,
    body: Result<Json<ConstructionDeriveRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result = match decode(body) {
        Ok(request) => state.api.derive(request).await,
        Err(e) => Err(e),
    };
    respond(&state, "derive", started, result)
}

async fn combine_handler(
    State(state): State<AppState>,
    body: Result<Json<ConstructionCombineRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result = match decode(body) {
        Ok(request) => state.api.combine(request).await,
        Err(e) => Err(e),
    };
    respond(&state, "combine", started, result)
}

async fn hash_handler(
    State(state): State<AppState>,
    body: Result<Json<ConstructionHashRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result = match decode(body) {
        Ok(request) => state.api.hash(request).await,
        Err(e) => Err(e),
    };
    respond(&state, "hash", started, result)
}

async fn parse_handler(
    State(state): State<AppState>,
    body: Result<Json<ConstructionParseRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result = match decode(body) {
        Ok(request) => state.api.parse(request).await,
        Err(e) => Err(e),
    };
    respond(&state, "parse", started, result)
}

async fn submit_handler(
    State(state): State<AppState>,
    body: Result<Json<ConstructionSubmitRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result = match decode(body) {
        Ok(request) => state.api.submit(request).await,
        Err(e) => Err(e),
    };
    respond(&state, "submit", started, result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
