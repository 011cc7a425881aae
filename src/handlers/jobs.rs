use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{created, ApiError};
use crate::models::*;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    #[serde(default = "default_limit")]
    pub limit: i32,
}

fn default_limit() -> i32 {
    50
}

/// GET /api/jobs/:id
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobRun>, ApiError> {
    let run = state
        .store
        .get_job_run(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job run"))?;
    Ok(Json(run))
}

/// GET /api/jobs, newest first
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<JobsQuery>,
) -> Result<Json<Vec<JobRun>>, ApiError> {
    let limit = query.limit.clamp(1, 200);
    let runs = state.store.list_job_runs(limit).await?;
    Ok(Json(runs))
}

/// POST /api/jobs/sw-currency/run
pub async fn run_sw_currency_review(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<JobRun>), ApiError> {
    let run = state
        .job_service
        .enqueue(job_name::SW_CURRENCY_REVIEW, "manual")
        .await?;
    Ok(created(run))
}

/// POST /api/jobs/sw-currency/lint
pub async fn run_sw_currency_lint(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<JobRun>), ApiError> {
    let run = state
        .job_service
        .enqueue(job_name::SW_CURRENCY_LINT, "manual")
        .await?;
    Ok(created(run))
}
