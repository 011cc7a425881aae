use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::{created, require, ApiError};

pub async fn list_manufacturers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Manufacturer>>, ApiError> {
    let items = state.store.list_manufacturers().await?;
    Ok(Json(items))
}

pub async fn get_manufacturer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Manufacturer>, ApiError> {
    let item = state
        .store
        .get_manufacturer(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Manufacturer"))?;
    Ok(Json(item))
}

pub async fn create_manufacturer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateManufacturerRequest>,
) -> Result<(StatusCode, Json<Manufacturer>), ApiError> {
    require(&req.name, "name")?;
    let item = state.store.create_manufacturer(&req).await?;
    Ok(created(item))
}

pub async fn update_manufacturer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateManufacturerRequest>,
) -> Result<Json<Manufacturer>, ApiError> {
    require(&req.name, "name")?;
    let item = state.store.update_manufacturer(id, &req).await?;
    Ok(Json(item))
}

pub async fn delete_manufacturer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_manufacturer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
