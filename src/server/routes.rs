// src/server/routes.rs

//! Route table for the job-control surface.

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::AppState;

/// Build the router with all API routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/jobs", post(handlers::start_job))
        .route("/api/jobs/:id", get(handlers::poll_job))
        .route("/api/exports", get(handlers::list_exports))
        .route(
            "/api/exports/:name",
            get(handlers::fetch_export).delete(handlers::delete_export),
        )
        .with_state(state)
}
