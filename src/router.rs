use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // DCIM routes
        .route(
            "/api/manufacturers",
            get(handlers::manufacturers::list_manufacturers).post(handlers::manufacturers::create_manufacturer),
        )
        .route(
            "/api/manufacturers/:id",
            get(handlers::manufacturers::get_manufacturer)
                .put(handlers::manufacturers::update_manufacturer)
                .delete(handlers::manufacturers::delete_manufacturer),
        )
        .route(
            "/api/device-roles",
            get(handlers::device_roles::list_device_roles).post(handlers::device_roles::create_device_role),
        )
        .route(
            "/api/device-roles/:id",
            get(handlers::device_roles::get_device_role)
                .put(handlers::device_roles::update_device_role)
                .delete(handlers::device_roles::delete_device_role),
        )
        .route(
            "/api/device-types",
            get(handlers::device_types::list_device_types).post(handlers::device_types::create_device_type),
        )
        .route(
            "/api/device-types/:id",
            get(handlers::device_types::get_device_type)
                .put(handlers::device_types::update_device_type)
                .delete(handlers::device_types::delete_device_type),
        )
        .route("/api/device-types/:id/lint", get(handlers::device_types::lint_device_type))
        .route(
            "/api/devices",
            get(handlers::devices::list_devices).post(handlers::devices::create_device),
        )
        .route(
            "/api/devices/:id",
            get(handlers::devices::get_device)
                .put(handlers::devices::update_device)
                .delete(handlers::devices::delete_device),
        )
        .route(
            "/api/interfaces",
            get(handlers::interfaces::list_interfaces).post(handlers::interfaces::create_interface),
        )
        .route(
            "/api/interfaces/:id",
            get(handlers::interfaces::get_interface).delete(handlers::interfaces::delete_interface),
        )
        // IPAM routes
        .route(
            "/api/ip-addresses",
            get(handlers::ipam::list_ip_addresses).post(handlers::ipam::create_ip_address),
        )
        .route(
            "/api/ip-addresses/:id",
            get(handlers::ipam::get_ip_address)
                .put(handlers::ipam::update_ip_address)
                .delete(handlers::ipam::delete_ip_address),
        )
        .route(
            "/api/vrfs",
            get(handlers::ipam::list_vrfs).post(handlers::ipam::create_vrf),
        )
        .route(
            "/api/vrfs/:id",
            get(handlers::ipam::get_vrf)
                .put(handlers::ipam::update_vrf)
                .delete(handlers::ipam::delete_vrf),
        )
        // Tenancy and extras
        .route(
            "/api/tenants",
            get(handlers::tenants::list_tenants).post(handlers::tenants::create_tenant),
        )
        .route(
            "/api/tenants/:id",
            get(handlers::tenants::get_tenant)
                .put(handlers::tenants::update_tenant)
                .delete(handlers::tenants::delete_tenant),
        )
        .route(
            "/api/tags",
            get(handlers::tags::list_tags).post(handlers::tags::create_tag),
        )
        .route(
            "/api/tags/:id",
            get(handlers::tags::get_tag)
                .put(handlers::tags::update_tag)
                .delete(handlers::tags::delete_tag),
        )
        .route(
            "/api/entnets",
            get(handlers::entnets::list_entnets).post(handlers::entnets::create_entnet),
        )
        .route(
            "/api/entnets/:id",
            get(handlers::entnets::get_entnet)
                .put(handlers::entnets::update_entnet)
                .delete(handlers::entnets::delete_entnet),
        )
        // Settings routes
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        // Job routes
        .route("/api/jobs", get(handlers::jobs::list_jobs))
        .route("/api/jobs/sw-currency/run", post(handlers::jobs::run_sw_currency_review))
        .route("/api/jobs/sw-currency/lint", post(handlers::jobs::run_sw_currency_lint))
        .route("/api/jobs/:id", get(handlers::jobs::get_job))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
