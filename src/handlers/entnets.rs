use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::{created, require, ApiError};

pub async fn list_entnets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EntNet>>, ApiError> {
    let entnets = state.store.list_entnets().await?;
    Ok(Json(entnets))
}

pub async fn get_entnet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<EntNet>, ApiError> {
    let entnet = state
        .store
        .get_entnet(id)
        .await?
        .ok_or_else(|| ApiError::not_found("EntNet"))?;
    Ok(Json(entnet))
}

/// Create an EntNet; the name must be unique and tags must already exist
pub async fn create_entnet(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEntNetRequest>,
) -> Result<(StatusCode, Json<EntNet>), ApiError> {
    require(&req.name, "name")?;
    let entnet = state.store.create_entnet(&req).await?;
    Ok(created(entnet))
}

pub async fn update_entnet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateEntNetRequest>,
) -> Result<Json<EntNet>, ApiError> {
    require(&req.name, "name")?;
    let entnet = state.store.update_entnet(id, &req).await?;
    Ok(Json(entnet))
}

pub async fn delete_entnet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_entnet(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
