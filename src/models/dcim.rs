use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateManufacturerRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRole {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeviceRoleRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// DeviceType is a hardware/software model shared by many devices.
///
/// `software_version_mgmt` holds the operator-authored version policy as raw
/// JSON so that malformed policies can be stored and reported by the lint pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: i64,
    pub manufacturer_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_slug: Option<String>,
    pub model: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_version_mgmt: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeviceType {
    /// The policy blob, if one is attached and non-empty.
    pub fn version_policy_blob(&self) -> Option<&serde_json::Value> {
        self.software_version_mgmt.as_ref().filter(|v| is_truthy(v))
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeviceTypeRequest {
    pub manufacturer_id: i64,
    pub model: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub software_version_mgmt: Option<serde_json::Value>,
}

/// Software custom fields carried on every device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftwareField {
    Version,
    CurrencyStatus,
    VersionTarget,
    CurrencyNotes,
}

impl SoftwareField {
    pub fn key(self) -> &'static str {
        match self {
            SoftwareField::Version => "software_version",
            SoftwareField::CurrencyStatus => "software_currency_status",
            SoftwareField::VersionTarget => "software_version_target",
            SoftwareField::CurrencyNotes => "software_currency_notes",
        }
    }
}

/// Custom field data stored on a device as a JSON document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareFields {
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub software_currency_status: Option<String>,
    #[serde(default)]
    pub software_version_target: Option<String>,
    #[serde(default)]
    pub software_currency_notes: Option<String>,
}

impl SoftwareFields {
    pub fn get(&self, field: SoftwareField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: SoftwareField, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    fn slot(&self, field: SoftwareField) -> &Option<String> {
        match field {
            SoftwareField::Version => &self.software_version,
            SoftwareField::CurrencyStatus => &self.software_currency_status,
            SoftwareField::VersionTarget => &self.software_version_target,
            SoftwareField::CurrencyNotes => &self.software_currency_notes,
        }
    }

    fn slot_mut(&mut self, field: SoftwareField) -> &mut Option<String> {
        match field {
            SoftwareField::Version => &mut self.software_version,
            SoftwareField::CurrencyStatus => &mut self.software_currency_status,
            SoftwareField::VersionTarget => &mut self.software_version_target,
            SoftwareField::CurrencyNotes => &mut self.software_currency_notes,
        }
    }
}

/// Device is a single piece of network equipment in the inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub device_type_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_slug: Option<String>,
    pub role_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_ip4_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_ip6_id: Option<i64>,
    pub custom_fields: SoftwareFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// CreateDeviceRequest for creating and updating devices
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeviceRequest {
    pub name: String,
    pub device_type_id: i64,
    pub role_id: i64,
    #[serde(default)]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub primary_ip4_id: Option<i64>,
    #[serde(default)]
    pub primary_ip6_id: Option<i64>,
    #[serde(default)]
    pub custom_fields: SoftwareFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    pub id: i64,
    pub device_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInterfaceRequest {
    pub device_id: i64,
    pub name: String,
}
