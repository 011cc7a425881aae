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

fn validate_tag(req: &CreateTagRequest) -> Result<(), ApiError> {
    require(&req.name, "name")?;
    let slug = utils::slug_or_default(req.slug.as_deref(), &req.name);
    if !utils::is_valid_slug(&slug) {
        return Err(ApiError::bad_request(format!("invalid slug '{}'", slug)));
    }
    if req.color.len() != 6 || !req.color.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ApiError::bad_request("color must be a 6-digit hex value"));
    }
    Ok(())
}

pub async fn list_tags(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = state.store.list_tags().await?;
    Ok(Json(tags))
}

pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Tag>, ApiError> {
    let tag = state
        .store
        .get_tag(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tag"))?;
    Ok(Json(tag))
}

pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    validate_tag(&req)?;
    let tag = state.store.create_tag(&req).await?;
    Ok(created(tag))
}

pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateTagRequest>,
) -> Result<Json<Tag>, ApiError> {
    validate_tag(&req)?;
    let tag = state.store.update_tag(id, &req).await?;
    Ok(Json(tag))
}

pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_tag(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
