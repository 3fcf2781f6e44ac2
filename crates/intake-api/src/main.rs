//! intake-api - HTTP intake adapter for the document pipeline
//!
//! Thin axum binary standing in for the hosting event-driven runtime:
//! `POST /v1/events` accepts a storage event batch and returns the batch
//! report; the staging routes expose the pending-review workflow to the
//! reviewer service. Trusted internal surface, no end-user authentication.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use intake_core::{
    defaults, BatchReport, EventBatch, ObjectStore, PipelineConfig, ReviewDecision, StagingRecord,
};
use intake_db::Database;
use intake_extract::HttpExtractionBackend;
use intake_pipeline::{process_batch, PipelineContext};
use intake_storage::{FilesystemStore, HttpObjectStore};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// Pipeline dependencies (repositories, backends, config).
    ctx: PipelineContext,
    /// Full database handle for pool health reporting. `None` when the
    /// router runs against in-memory backends (tests).
    db: Option<Database>,
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Internal(intake_core::Error),
    NotFound(String),
    BadRequest(String),
}

impl From<intake_core::Error> for ApiError {
    fn from(err: intake_core::Error) -> Self {
        match &err {
            intake_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            intake_core::Error::StagingNotFound(id) => {
                ApiError::NotFound(format!("staging record {}", id))
            }
            intake_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let pool = state.db.as_ref().map(|db| {
        serde_json::json!({
            "size": db.pool.size(),
            "idle": db.pool.num_idle(),
        })
    });

    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "pool": pool,
    }))
}

/// Accept a storage event batch and process it to completion.
///
/// Always responds 200: per-record failures are part of the report, not
/// HTTP errors. The event source retries based on the report contents.
async fn receive_events(
    State(state): State<AppState>,
    Json(batch): Json<EventBatch>,
) -> Json<BatchReport> {
    info!(
        subsystem = "api",
        op = "receive_events",
        record_count = batch.records.len(),
        "Received event batch"
    );
    Json(process_batch(&state.ctx, &batch).await)
}

#[derive(Debug, Deserialize)]
struct PageParams {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ListStagingResponse {
    data: Vec<StagingRecord>,
    limit: i64,
    offset: i64,
}

async fn list_staging(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<ListStagingResponse>, ApiError> {
    let limit = params.limit.unwrap_or(defaults::PAGE_LIMIT).clamp(1, 200);
    let offset = params.offset.unwrap_or(defaults::PAGE_OFFSET).max(0);
    let data = state.ctx.staging.list_pending(limit, offset).await?;
    Ok(Json(ListStagingResponse {
        data,
        limit,
        offset,
    }))
}

async fn get_staging(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StagingRecord>, ApiError> {
    let record = state.ctx.staging.find_by_id(id).await?;
    Ok(Json(record))
}

async fn review_staging(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(decision): Json<ReviewDecision>,
) -> Result<Json<StagingRecord>, ApiError> {
    let record = state.ctx.staging.record_review(id, decision).await?;
    info!(
        subsystem = "api",
        op = "review_staging",
        staging_id = %record.id,
        status = %record.status,
        "Review recorded"
    );
    Ok(Json(record))
}

// =============================================================================
// ROUTER
// =============================================================================

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/events", post(receive_events))
        .route("/v1/staging", get(list_staging))
        .route("/v1/staging/:id", get(get_staging))
        .route("/v1/staging/:id/review", post(review_staging))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(RequestBodyLimitLayer::new(16 * 1024 * 1024))
        .with_state(state)
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "intake_api=debug,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/intake".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults::SERVER_PORT);

    let config = PipelineConfig::from_env();

    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    db.run_migrations().await?;
    intake_db::log_pool_metrics(&db.pool);
    info!("Database ready");

    let store: Arc<dyn ObjectStore> = match std::env::var(defaults::ENV_STORAGE_BASE_URL) {
        Ok(base_url) => {
            info!(base_url = %base_url, "Using HTTP object store gateway");
            Arc::new(HttpObjectStore::with_timeout(base_url, config.store_timeout))
        }
        Err(_) => {
            let path = std::env::var("OBJECT_STORE_PATH")
                .unwrap_or_else(|_| "/var/lib/intake/objects".to_string());
            info!(path = %path, "Using filesystem object store");
            Arc::new(FilesystemStore::new(path))
        }
    };

    let extract_base = std::env::var(defaults::ENV_EXTRACT_BASE_URL)
        .unwrap_or_else(|_| defaults::EXTRACT_BASE_URL.to_string());
    info!(base_url = %extract_base, "Using extraction service");
    let extraction = Arc::new(HttpExtractionBackend::with_timeout(
        extract_base,
        config.extract_timeout,
    ));

    let ctx = PipelineContext::new(
        Arc::new(db.staging.clone()),
        Arc::new(db.documents.clone()),
        store,
        extraction,
        config,
    );

    let state = AppState { ctx, db: Some(db) };
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
