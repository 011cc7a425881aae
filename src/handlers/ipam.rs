use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::*;
use crate::services::ip_automation;
use crate::AppState;

use super::{created, require, ApiError};

// ========== IP Address Handlers ==========

#[derive(Debug, Deserialize)]
pub struct IpAddressQuery {
    pub interface_id: Option<i64>,
}

pub async fn list_ip_addresses(
    State(state): State<Arc<AppState>>,
    Query(q): Query<IpAddressQuery>,
) -> Result<Json<Vec<IpAddress>>, ApiError> {
    let ips = match q.interface_id {
        Some(id) => state.store.list_ip_addresses_by_interface(id).await?,
        None => state.store.list_ip_addresses().await?,
    };
    Ok(Json(ips))
}

pub async fn get_ip_address(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<IpAddress>, ApiError> {
    let ip = state
        .store
        .get_ip_address(id)
        .await?
        .ok_or_else(|| ApiError::not_found("IP address"))?;
    Ok(Json(ip))
}

/// Create an IP address; the post-save automation runs once the write commits
pub async fn create_ip_address(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateIpAddressRequest>,
) -> Result<(StatusCode, Json<IpAddress>), ApiError> {
    require(&req.address, "address")?;
    let saved = state.store.create_ip_address(&req).await?;
    ip_automation::on_ip_saved(state.store.clone(), saved.clone());
    Ok(created(saved.into_inner()))
}

pub async fn update_ip_address(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateIpAddressRequest>,
) -> Result<Json<IpAddress>, ApiError> {
    require(&req.address, "address")?;
    let saved = state.store.update_ip_address(id, &req).await?;
    ip_automation::on_ip_saved(state.store.clone(), saved.clone());
    Ok(Json(saved.into_inner()))
}

pub async fn delete_ip_address(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_ip_address(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========== VRF Handlers ==========

pub async fn list_vrfs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Vrf>>, ApiError> {
    let vrfs = state.store.list_vrfs().await?;
    Ok(Json(vrfs))
}

pub async fn get_vrf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vrf>, ApiError> {
    let vrf = state
        .store
        .get_vrf(id)
        .await?
        .ok_or_else(|| ApiError::not_found("VRF"))?;
    Ok(Json(vrf))
}

pub async fn create_vrf(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateVrfRequest>,
) -> Result<(StatusCode, Json<Vrf>), ApiError> {
    require(&req.name, "name")?;
    let vrf = state.store.create_vrf(&req).await?;
    Ok(created(vrf))
}

pub async fn update_vrf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CreateVrfRequest>,
) -> Result<Json<Vrf>, ApiError> {
    require(&req.name, "name")?;
    let vrf = state.store.update_vrf(id, &req).await?;
    Ok(Json(vrf))
}

pub async fn delete_vrf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_vrf(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
