use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::{created, require, ApiError};

pub async fn list_device_roles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DeviceRole>>, ApiError> {
    let items = state.store.list_device_roles().await?;
    Ok(Json(items))
}

pub async fn get_device_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeviceRole>, ApiError> {
    let item = state
        .store
        .get_device_role(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Device role"))?;
    Ok(Json(item))
}

pub async fn create_device_role(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDeviceRoleRequest>,
) -> Result<(StatusCode, Json<DeviceRole>), ApiError> {
    require(&req.name, "name")?;
    let item = state.store.create_device_role(&req).await?;
    Ok(created(item))
}

pub async fn update_device_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateDeviceRoleRequest>,
) -> Result<Json<DeviceRole>, ApiError> {
    require(&req.name, "name")?;
    let item = state.store.update_device_role(id, &req).await?;
    Ok(Json(item))
}

pub async fn delete_device_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_device_role(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
