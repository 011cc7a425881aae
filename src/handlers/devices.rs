use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::{created, require, ApiError, PaginationQuery};

/// Name is required; a stored currency status must be one of the configured labels
async fn validate_device(state: &AppState, req: &CreateDeviceRequest) -> Result<(), ApiError> {
    require(&req.name, "name")?;
    if let Some(status) = req.custom_fields.software_currency_status.as_deref() {
        let settings = state.store.get_settings().await?;
        if settings.status_labels.parse(status).is_none() {
            return Err(ApiError::bad_request(format!(
                "'{}' is not a valid software currency status",
                status
            )));
        }
    }
    Ok(())
}

/// List all devices (with optional pagination)
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let (limit, offset) = page.sanitize();
    let devices = state.store.list_devices_paged(limit, offset).await?;
    Ok(Json(devices))
}

pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Device>, ApiError> {
    let device = state
        .store
        .get_device(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Device"))?;
    Ok(Json(device))
}

pub async fn create_device(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    validate_device(&state, &req).await?;
    let device = state.store.create_device(&req).await?;
    Ok(created(device))
}

pub async fn update_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<Json<Device>, ApiError> {
    validate_device(&state, &req).await?;
    let device = state.store.update_device(id, &req).await?;
    Ok(Json(device))
}

pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_device(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
