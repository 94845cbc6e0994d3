//! HTTP surface for the job system
//!
//! Submission returns 202 with the job id immediately; clients poll the job
//! endpoints for progress and outcome.
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::modules::import::mealdb::{meal_import_worker, MealImportParams};
use crate::modules::import::site::{site_import_worker, SiteImportParams};
use crate::modules::jobs::domain::JobType;
use crate::shared::errors::{AppError, AppResult};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/jobs", post(create_job).get(list_jobs))
        .route("/api/jobs/:job_id", get(get_job))
        .route("/api/recipes/daily-import", post(daily_import))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
struct CreateJobRequest {
    job_type: String,
    #[serde(default)]
    params: serde_json::Value,
}

async fn create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> AppResult<impl IntoResponse> {
    let job_type: JobType = request
        .job_type
        .parse()
        .map_err(AppError::InvalidInput)?;

    // An absent params field means "all defaults"
    let params = if request.params.is_null() {
        json!({})
    } else {
        request.params
    };

    let job_id = submit_job(&state, job_type, params).await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "job_id": job_id }))))
}

async fn submit_job(
    state: &AppState,
    job_type: JobType,
    params: serde_json::Value,
) -> AppResult<Uuid> {
    let deps = Arc::clone(&state.deps);
    match job_type {
        JobType::ExternalMealImport => {
            let typed: MealImportParams = serde_json::from_value(params.clone())
                .map_err(|e| AppError::InvalidInput(format!("Invalid job params: {}", e)))?;
            state
                .jobs
                .submit(job_type, params, move |job_id| {
                    meal_import_worker(job_id, typed, deps)
                })
                .await
        }
        JobType::BatchSiteImport => {
            let typed: SiteImportParams = serde_json::from_value(params.clone())
                .map_err(|e| AppError::InvalidInput(format!("Invalid job params: {}", e)))?;
            state
                .jobs
                .submit(job_type, params, move |job_id| {
                    site_import_worker(job_id, typed, deps)
                })
                .await
        }
    }
}

async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let job = state
        .jobs
        .store()
        .get(job_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize)]
struct ListJobsQuery {
    limit: Option<usize>,
}

async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> impl IntoResponse {
    let jobs = state
        .jobs
        .store()
        .list_recent(query.limit.unwrap_or(50))
        .await;
    Json(json!({ "jobs": jobs }))
}

#[derive(Debug, Deserialize)]
struct DailyImportQuery {
    strategy: Option<String>,
    value: Option<String>,
    count: Option<u32>,
    user_id: Option<i32>,
}

/// Convenience alias for scheduled meal imports.
async fn daily_import(
    State(state): State<AppState>,
    Query(query): Query<DailyImportQuery>,
) -> AppResult<impl IntoResponse> {
    let params = json!({
        "count": query.count.unwrap_or(2),
        "user_id": query.user_id,
        "strategy": query.strategy,
        "value": query.value,
    });
    let job_id = submit_job(&state, JobType::ExternalMealImport, params).await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "job_id": job_id }))))
}
