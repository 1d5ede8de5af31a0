//! Cron-facing HTTP surface for the market sync pipeline.
//!
//! One route does the work: `GET /sync`, guarded by a bearer secret the cron
//! scheduler sends. The handler maps the coordinator's outcome onto the
//! status codes the scheduler understands: 200 for a completed run (including
//! "nothing new"), 409 when another run holds the lock, 500 when the run
//! itself failed. `/health` exists for the hosting platform's probes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pm_sync::{RunOutcome, SyncCoordinator, SyncResult};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Seam between the router and the pipeline so handlers can be exercised
/// without a database or upstream subgraphs.
#[async_trait]
pub trait SyncRunner: Send + Sync {
    async fn run_sync(&self, full: bool) -> SyncResult<RunOutcome>;
}

#[async_trait]
impl SyncRunner for SyncCoordinator {
    async fn run_sync(&self, full: bool) -> SyncResult<RunOutcome> {
        self.run(full).await
    }
}

pub struct AppState {
    runner: Arc<dyn SyncRunner>,
    cron_secret: String,
}

impl AppState {
    pub fn new(runner: Arc<dyn SyncRunner>, cron_secret: impl Into<String>) -> Self {
        Self {
            runner,
            cron_secret: cron_secret.into(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/sync", get(sync_handler))
        .route("/health", get(health_handler))
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on 0.0.0.0:{}", port);
    axum::serve(listener, app(state)).await
}

async fn sync_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers, &state.cron_secret) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthenticated." })),
        )
            .into_response();
    }

    match state.runner.run_sync(false).await {
        Ok(RunOutcome::Completed(report)) => {
            let mut body = json!({
                "success": true,
                "processed": report.processed,
                "total": report.total,
                "errors": report.errors.len(),
                "errorDetails": report.errors,
            });
            if let Some(message) = &report.message {
                body["message"] = json!(message);
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(RunOutcome::Skipped) => (
            StatusCode::CONFLICT,
            Json(json!({
                "success": false,
                "message": "Sync already running",
                "skipped": true,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Sync run failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn authorized(headers: &HeaderMap, secret: &str) -> bool {
    let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    value == format!("Bearer {}", secret)
}
