use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::utils;
use crate::AppState;

use super::{created, require, ApiError};

fn validate_tenant(req: &CreateTenantRequest) -> Result<(), ApiError> {
    require(&req.name, "name")?;
    let slug = utils::slug_or_default(req.slug.as_deref(), &req.name);
    if !utils::is_valid_slug(&slug) {
        return Err(ApiError::bad_request(format!("invalid slug '{}'", slug)));
    }
    Ok(())
}

pub async fn list_tenants(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Tenant>>, ApiError> {
    let items = state.store.list_tenants().await?;
    Ok(Json(items))
}

pub async fn get_tenant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Tenant>, ApiError> {
    let item = state
        .store
        .get_tenant(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tenant"))?;
    Ok(Json(item))
}

pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<Tenant>), ApiError> {
    validate_tenant(&req)?;
    let item = state.store.create_tenant(&req).await?;
    Ok(created(item))
}

pub async fn update_tenant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateTenantRequest>,
) -> Result<Json<Tenant>, ApiError> {
    validate_tenant(&req)?;
    let item = state.store.update_tenant(id, &req).await?;
    Ok(Json(item))
}

pub async fn delete_tenant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_tenant(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
