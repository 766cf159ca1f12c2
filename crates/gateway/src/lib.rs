//! HTTP API gateway for inkmath.
//!
//! Exposes the two solving endpoints plus a health check:
//!
//! - `POST /`        — solve the drawing in the posted image
//! - `POST /explain` — conversational explanation of a solution
//! - `GET  /health`  — liveness probe
//!
//! Built on Axum. Each inbound call is an independent tokio task with no
//! shared mutable state; the only suspension point is the upstream
//! generator call. Validation failures map to 422 before the generator is
//! ever invoked, generator failures map to 502, and unparseable generator
//! output is NOT an error — the solver absorbs it into a sentinel record
//! inside a success-shaped payload. That asymmetry is part of the contract.

pub mod decode;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info};

use inkmath_config::AppConfig;
use inkmath_core::error::{GeneratorError, RequestError};
use inkmath_core::record::{AnswerRecord, ConversationTurn, VariableBindings};
use inkmath_solver::Solver;

/// Hand-drawn canvases export multi-megabyte data URIs.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub solver: Solver,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.allowed_origins);

    Router::new()
        .route("/", post(solve_handler))
        .route("/explain", post(explain_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy from config. The drawing frontend lives on another origin,
/// so the default is allow-any; deployments can pin exact origins instead.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let generator = inkmath_providers::build_from_config(&config)?;
    let solver = Solver::new(generator);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(GatewayState { config, solver });
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Error mapping ---

/// Errors a handler can surface to the HTTP layer.
///
/// Normalization failures never appear here — they stay inside the 200
/// payload by design.
#[derive(Debug)]
pub enum ApiError {
    Request(RequestError),
    Generator(GeneratorError),
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        Self::Request(e)
    }
}

impl From<GeneratorError> for ApiError {
    fn from(e: GeneratorError) -> Self {
        Self::Generator(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    status: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Request(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Generator(e) => {
                error!(error = %e, "Upstream generation failed");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
        };

        (
            status,
            Json(ErrorBody {
                message,
                status: "error",
            }),
        )
            .into_response()
    }
}

// --- Handlers ---

#[derive(Deserialize)]
struct SolveRequest {
    image: String,
    #[serde(default)]
    dict_of_vars: VariableBindings,
}

#[derive(Serialize)]
struct SolveResponse {
    message: &'static str,
    data: Vec<AnswerRecord>,
    status: &'static str,
}

async fn solve_handler(
    State(state): State<SharedState>,
    Json(payload): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, ApiError> {
    let image = decode::decode_data_uri(&payload.image)?;
    let records = state.solver.solve(&image, &payload.dict_of_vars).await?;

    Ok(Json(SolveResponse {
        message: "Image processed",
        data: records,
        status: "success",
    }))
}

#[derive(Deserialize)]
struct ExplainRequest {
    image: String,
    question: String,
    #[serde(default)]
    history: Vec<ConversationTurn>,
}

#[derive(Serialize)]
struct ExplainResponse {
    message: &'static str,
    data: String,
    status: &'static str,
}

async fn explain_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let image = decode::decode_data_uri(&payload.image)?;
    let explanation = state
        .solver
        .explain(&image, &payload.question, &payload.history)
        .await?;

    Ok(Json(ExplainResponse {
        message: "Explanation generated",
        data: explanation,
        status: "success",
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
