use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::{created, require, ApiError};

#[derive(Debug, Deserialize)]
pub struct InterfaceQuery {
    pub device_id: i64,
}

pub async fn list_interfaces(
    State(state): State<Arc<AppState>>,
    Query(q): Query<InterfaceQuery>,
) -> Result<Json<Vec<Interface>>, ApiError> {
    let interfaces = state.store.list_interfaces(q.device_id).await?;
    Ok(Json(interfaces))
}

pub async fn get_interface(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Interface>, ApiError> {
    let interface = state
        .store
        .get_interface(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Interface"))?;
    Ok(Json(interface))
}

pub async fn create_interface(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateInterfaceRequest>,
) -> Result<(StatusCode, Json<Interface>), ApiError> {
    require(&req.name, "name")?;
    let interface = state.store.create_interface(&req).await?;
    Ok(created(interface))
}

pub async fn delete_interface(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_interface(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
