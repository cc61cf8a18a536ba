// src/server/handlers.rs

//! API handlers for job control and export management.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::job::{JobStatus, StartOutcome};
use crate::pipeline::{run_pipeline, JobRequest};

use super::AppState;

/// Body of a start-job request.
#[derive(Debug, Deserialize)]
pub struct StartJobBody {
    pub query: String,

    #[serde(default = "default_target_count")]
    pub target_count: usize,

    #[serde(default = "default_visit_internal")]
    pub visit_internal_pages: bool,
}

fn default_target_count() -> usize {
    20
}

fn default_visit_internal() -> bool {
    true
}

/// `POST /api/jobs` — accept a job or report the one already running.
pub async fn start_job(
    State(state): State<AppState>,
    Json(body): Json<StartJobBody>,
) -> Response {
    let query = body.query.trim().to_string();
    if query.is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "query must not be empty");
    }
    if body.target_count == 0 {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "target_count must be > 0");
    }

    match state.tracker.try_start(&query, body.target_count) {
        StartOutcome::Busy {
            query,
            elapsed_seconds,
        } => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "a job is already running",
                "query": query,
                "elapsed_seconds": elapsed_seconds,
            })),
        )
            .into_response(),

        StartOutcome::Accepted(job) => {
            let request = JobRequest {
                query,
                target_count: body.target_count,
                visit_internal_pages: body.visit_internal_pages,
            };
            let config = Arc::clone(&state.config);
            let renderer = Arc::clone(&state.renderer);
            let store = Arc::clone(&state.store);
            let tracker = Arc::clone(&state.tracker);
            let job_id = job.id.clone();

            tokio::spawn(async move {
                match run_pipeline(&config, renderer.as_ref(), &store, &request).await {
                    Ok(summary) => log::info!(
                        "Job {} finished: {} listings -> {}",
                        job_id,
                        summary.listing_count,
                        summary.export_file
                    ),
                    Err(e) => log::error!("Job {} failed: {}", job_id, e),
                }
                tracker.complete(&job_id);
            });

            (
                StatusCode::ACCEPTED,
                Json(json!({ "job_id": job.id, "status": "running" })),
            )
                .into_response()
        }
    }
}

/// `GET /api/jobs/:id` — poll a job.
pub async fn poll_job(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.tracker.status(&id) {
        JobStatus::Running {
            query,
            elapsed_seconds,
        } => Json(json!({
            "status": "running",
            "query": query,
            "elapsed_seconds": elapsed_seconds,
        }))
        .into_response(),
        JobStatus::Completed => Json(json!({ "status": "completed" })).into_response(),
        JobStatus::Unknown => Json(json!({ "status": "unknown" })).into_response(),
    }
}

/// `GET /api/exports` — list export files, newest first.
pub async fn list_exports(State(state): State<AppState>) -> Response {
    match state.store.list().await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => internal_error(e),
    }
}

/// `GET /api/exports/:name` — download one export.
pub async fn fetch_export(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.store.read(&name).await {
        Ok(Some(bytes)) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/csv")
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            )
            .body(Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "export not found"),
        Err(AppError::Export(message)) => error_response(StatusCode::BAD_REQUEST, &message),
        Err(e) => internal_error(e),
    }
}

/// `DELETE /api/exports/:name` — delete one export.
pub async fn delete_export(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.store.delete(&name).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "export not found"),
        Err(AppError::Export(message)) => error_response(StatusCode::BAD_REQUEST, &message),
        Err(e) => internal_error(e),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn internal_error(e: AppError) -> Response {
    log::error!("Handler error: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}
