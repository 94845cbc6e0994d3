//! Recipe diary backend: background import jobs over a polled job store.
pub mod modules;
pub mod shared;

use std::sync::Arc;

use axum::Router;

use modules::import::ImportDeps;
use modules::jobs::JobManager;
use shared::config::AppConfig;

/// Shared handles for the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jobs: Arc<JobManager>,
    pub deps: Arc<ImportDeps>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, deps: Arc<ImportDeps>) -> Self {
        let jobs = Arc::new(JobManager::new(
            Arc::clone(&deps.job_store),
            config.max_concurrent_jobs,
        ));
        Self { config, jobs, deps }
    }
}

pub fn router(state: AppState) -> Router {
    modules::jobs::routes::router(state)
}
