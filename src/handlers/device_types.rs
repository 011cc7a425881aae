use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::currency::lint_software_version_data;
use crate::models::*;
use crate::AppState;

use super::{created, require, ApiError};

pub async fn list_device_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DeviceType>>, ApiError> {
    let types = state.store.list_device_types().await?;
    Ok(Json(types))
}

pub async fn get_device_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeviceType>, ApiError> {
    let dt = state
        .store
        .get_device_type(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Device type"))?;
    Ok(Json(dt))
}

/// Malformed version policies are stored as-is; the lint reports them
pub async fn create_device_type(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDeviceTypeRequest>,
) -> Result<(StatusCode, Json<DeviceType>), ApiError> {
    require(&req.model, "model")?;
    let dt = state.store.create_device_type(&req).await?;
    Ok(created(dt))
}

pub async fn update_device_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateDeviceTypeRequest>,
) -> Result<Json<DeviceType>, ApiError> {
    require(&req.model, "model")?;
    let dt = state.store.update_device_type(id, &req).await?;
    Ok(Json(dt))
}

pub async fn delete_device_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_device_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct LintResponse {
    pub valid: bool,
    pub log: JobLog,
}

/// Lint a single device type's version policy
pub async fn lint_device_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<LintResponse>, ApiError> {
    let dt = state
        .store
        .get_device_type(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Device type"))?;

    let mut log = JobLog::new();
    let valid = match dt.version_policy_blob() {
        Some(blob) => {
            log.log(format!("Device-Type: {} - Linting version data", dt.model));
            lint_software_version_data(blob, &mut log).is_some()
        }
        None => {
            log.log(format!("Device-Type: {} - No software version data", dt.model));
            false
        }
    };
    Ok(Json(LintResponse { valid, log }))
}
