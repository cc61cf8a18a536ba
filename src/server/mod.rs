// src/server/mod.rs

//! HTTP job-control surface.
//!
//! Thin layer over the pipeline: start a job, poll it, and manage export
//! files. Job execution happens on a spawned task; the start request is
//! acknowledged immediately.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::exports::ExportStore;
use crate::job::JobTracker;
use crate::render::{ChromeRenderer, Renderer};

/// Shared state for the job-control server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tracker: Arc<JobTracker>,
    pub store: Arc<ExportStore>,
    pub renderer: Arc<dyn Renderer>,
}

/// Start the job-control server.
pub async fn serve(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| AppError::config(format!("invalid bind address: {e}")))?;

    let renderer = Arc::new(ChromeRenderer::new(
        config.crawler.clone(),
        config.browser.clone(),
    ));
    let store = Arc::new(ExportStore::new(config.server.exports_dir.clone()));

    let state = AppState {
        config: Arc::new(config),
        tracker: Arc::new(JobTracker::new()),
        store,
        renderer,
    };

    let app = create_router(state);

    log::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
