use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// IP address status values
#[allow(dead_code)]
pub mod ip_status {
    pub const ACTIVE: &str = "active";
    pub const RESERVED: &str = "reserved";
    pub const DEPRECATED: &str = "deprecated";
    pub const DHCP: &str = "dhcp";

    pub const ALL: &[&str] = &[ACTIVE, RESERVED, DEPRECATED, DHCP];
}

/// Object types an IP address can be assigned to
pub mod assigned_object {
    pub const INTERFACE: &str = "interface";
    pub const VM_INTERFACE: &str = "vminterface";

    pub const ALL: &[&str] = &[INTERFACE, VM_INTERFACE];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAddress {
    pub id: i64,
    pub address: String,
    pub family: i32,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_object_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_object_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vrf_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vrf_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IpAddress {
    /// True when the address is assigned to a device interface (not a VM interface)
    pub fn is_assigned_to_interface(&self) -> bool {
        self.assigned_object_type.as_deref() == Some(assigned_object::INTERFACE)
            && self.assigned_object_id.is_some()
    }

    pub fn has_tag(&self, slug: &str) -> bool {
        self.tags.iter().any(|t| t == slug)
    }
}

fn default_ip_status() -> String {
    ip_status::ACTIVE.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateIpAddressRequest {
    pub address: String,
    #[serde(default = "default_ip_status")]
    pub status: String,
    #[serde(default)]
    pub assigned_object_type: Option<String>,
    #[serde(default)]
    pub assigned_object_id: Option<i64>,
    #[serde(default)]
    pub vrf_id: Option<i64>,
    #[serde(default)]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub dns_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Tag slugs
    #[serde(default)]
    pub tags: Vec<String>,
}

// ========== VRF ==========

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vrf {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVrfRequest {
    pub name: String,
    #[serde(default)]
    pub rd: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
