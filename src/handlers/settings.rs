use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::*;
use crate::utils;
use crate::AppState;

use super::ApiError;

fn validate_settings(settings: &PluginSettings) -> Result<(), ApiError> {
    settings
        .status_labels
        .validate()
        .map_err(ApiError::bad_request)?;

    let slugs = [
        &settings.network_mgmt_tag_slug,
        &settings.skip_discovery_tag_slug,
    ];
    for slug in slugs.into_iter().chain(settings.tenant_tag_to_ip_tag.values()) {
        if !utils::is_valid_slug(slug) {
            return Err(ApiError::bad_request(format!("invalid tag slug '{}'", slug)));
        }
    }
    if settings.default_vrf_name.trim().is_empty() {
        return Err(ApiError::bad_request("default_vrf_name is required"));
    }
    Ok(())
}

/// Get the plugin settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PluginSettings>, ApiError> {
    let settings = state.store.get_settings().await?;
    Ok(Json(settings))
}

/// Replace the plugin settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<PluginSettings>,
) -> Result<Json<PluginSettings>, ApiError> {
    validate_settings(&settings)?;
    state.store.update_settings(&settings).await?;
    tracing::info!("Plugin settings updated");
    Ok(Json(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        assert!(validate_settings(&PluginSettings::default()).is_ok());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let mut settings = PluginSettings::default();
        settings.status_labels.exempted = settings.status_labels.target_active.clone();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_bad_mapping_slug_rejected() {
        let mut settings = PluginSettings::default();
        settings
            .tenant_tag_to_ip_tag
            .insert("acme".to_string(), "Acme IP".to_string());
        assert!(validate_settings(&settings).is_err());
    }
}
