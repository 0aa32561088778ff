//! Read-only HTTP mirror of the verses API.
//!
//! Serves whatever the configured [`Library`] resolves, with the same paths
//! and payload shapes as the public API, so a device (or another `gita`
//! pointed at it with `source.mode = "remote"`) can read from a local copy.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/chapters` | All chapters, ascending |
//! | `GET`  | `/chapter/{id}/` | One chapter (trailing slash optional) |
//! | `GET`  | `/slok/{chapter}/{verse}` | One verse |
//! | `GET`  | `/health` | Health check (returns version and source) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "no verse 2.99" } }
//! ```
//!
//! Error codes: `not_found` (404), `bad_gateway` (502) when the upstream
//! source could not be reached or returned bad data, `internal` (500).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use gita_core::error::AccessError;
use gita_core::models::{Chapter, Verse};
use log::{error, info};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::library::Library;

/// Starts the mirror on `server.bind` and serves until shutdown.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let library = Library::from_config(config).await?;
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    println!("Mirror listening on http://{}", config.server.bind);
    println!("  source: {}", library.describe());
    serve_library(library, listener).await
}

/// Serve `library` on an already-bound listener.
pub async fn serve_library(
    library: Library,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    axum::serve(listener, router(library)).await?;
    Ok(())
}

pub fn router(library: Library) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chapters", get(handle_chapters))
        .route("/chapter/{id}", get(handle_chapter))
        .route("/chapter/{id}/", get(handle_chapter))
        .route("/slok/{chapter}/{verse}", get(handle_slok))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(library)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        let (status, code) = match &err {
            AccessError::FetchFailed { .. }
            | AccessError::DataUnavailable(_)
            | AccessError::InvalidRecord { .. } => (StatusCode::BAD_GATEWAY, "bad_gateway"),
            AccessError::StorageFailure { .. } | AccessError::InvalidTarget(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        error!("{}", err);
        AppError {
            status,
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

// ============ Handlers ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    source: String,
}

async fn handle_health(State(library): State<Library>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: library.describe(),
    })
}

async fn handle_chapters(State(library): State<Library>) -> Result<Json<Vec<Chapter>>, AppError> {
    Ok(Json(library.get_chapters().await?))
}

async fn handle_chapter(
    State(library): State<Library>,
    Path(id): Path<String>,
) -> Result<Json<Chapter>, AppError> {
    info!("GET /chapter/{}", id);
    library
        .get_chapter(&id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("no chapter {}", id)))
}

async fn handle_slok(
    State(library): State<Library>,
    Path((chapter, verse)): Path<(String, String)>,
) -> Result<Json<Verse>, AppError> {
    library
        .get_slok(&chapter, &verse)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("no verse {}.{}", chapter, verse)))
}
