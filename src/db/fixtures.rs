//! Seeding helpers shared by store-backed tests.

use serde_json::{json, Value};

use super::Store;
use crate::models::*;

pub async fn manufacturer(store: &Store, slug: &str) -> Manufacturer {
    store
        .create_manufacturer(&CreateManufacturerRequest {
            name: slug.to_string(),
            slug: Some(slug.to_string()),
        })
        .await
        .unwrap()
}

pub async fn role(store: &Store, slug: &str) -> DeviceRole {
    store
        .create_device_role(&CreateDeviceRoleRequest {
            name: slug.to_string(),
            slug: Some(slug.to_string()),
        })
        .await
        .unwrap()
}

pub async fn device_type(store: &Store, manufacturer_id: i64, model: &str, policy: Option<Value>) -> DeviceType {
    store
        .create_device_type(&CreateDeviceTypeRequest {
            manufacturer_id,
            model: model.to_string(),
            slug: None,
            software_version_mgmt: policy,
        })
        .await
        .unwrap()
}

pub async fn tag(store: &Store, slug: &str) -> Tag {
    store
        .create_tag(&CreateTagRequest {
            name: slug.to_string(),
            slug: Some(slug.to_string()),
            color: "9e9e9e".to_string(),
        })
        .await
        .unwrap()
}

pub async fn tenant(store: &Store, slug: &str) -> Tenant {
    store
        .create_tenant(&CreateTenantRequest {
            name: slug.to_string(),
            slug: Some(slug.to_string()),
            description: None,
        })
        .await
        .unwrap()
}

pub async fn vrf(store: &Store, name: &str) -> Vrf {
    store
        .create_vrf(&CreateVrfRequest {
            name: name.to_string(),
            rd: None,
            description: None,
        })
        .await
        .unwrap()
}

pub fn ip_request(address: &str) -> CreateIpAddressRequest {
    serde_json::from_value(json!({ "address": address })).unwrap()
}

pub async fn ip_address(store: &Store, req: &CreateIpAddressRequest) -> IpAddress {
    store.create_ip_address(req).await.unwrap().into_inner()
}

pub fn device_request(name: &str, device_type_id: i64, role_id: i64) -> CreateDeviceRequest {
    CreateDeviceRequest {
        name: name.to_string(),
        device_type_id,
        role_id,
        tenant_id: None,
        primary_ip4_id: None,
        primary_ip6_id: None,
        custom_fields: SoftwareFields::default(),
    }
}

pub async fn device(store: &Store, req: &CreateDeviceRequest) -> Device {
    store.create_device(req).await.unwrap()
}

/// Policy with a single default role: target 17.9, accepted 17.6, retired 15.1
pub fn sample_policy() -> Value {
    json!([
        {
            "role": "default",
            "versions": {
                "target_active_version": ["17.9"],
                "accepted_active_versions": ["17.6"],
                "retired_versions": {"15.1": "EoL"}
            }
        }
    ])
}
