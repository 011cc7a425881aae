use sqlx::{Row, sqlite::SqliteRow};

use crate::models::*;

/// Filter empty strings to None; description columns store empty text instead of NULL
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

/// Split a GROUP_CONCAT column into its values
pub fn csv_to_vec(csv: Option<String>) -> Vec<String> {
    match csv {
        Some(s) if !s.is_empty() => s.split(',').map(|s| s.to_string()).collect(),
        _ => vec![],
    }
}

/// Map a SQLite row (joined with type, manufacturer and role) to a Device struct
pub fn map_device_row(row: &SqliteRow) -> Device {
    let cf_json: String = row.get("custom_field_data");
    let custom_fields: SoftwareFields = serde_json::from_str(&cf_json).unwrap_or_else(|e| {
        tracing::warn!("Unreadable custom field data on device {}: {}", row.get::<i64, _>("id"), e);
        SoftwareFields::default()
    });
    Device {
        id: row.get("id"),
        name: row.get("name"),
        device_type_id: row.get("device_type_id"),
        device_type_model: row.try_get::<Option<String>, _>("device_type_model").ok().flatten(),
        manufacturer_slug: row.try_get::<Option<String>, _>("manufacturer_slug").ok().flatten(),
        role_id: row.get("role_id"),
        role_slug: row.try_get::<Option<String>, _>("role_slug").ok().flatten(),
        tenant_id: row.try_get::<Option<i64>, _>("tenant_id").ok().flatten(),
        primary_ip4_id: row.try_get::<Option<i64>, _>("primary_ip4_id").ok().flatten(),
        primary_ip6_id: row.try_get::<Option<i64>, _>("primary_ip6_id").ok().flatten(),
        custom_fields,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to a DeviceType struct (with aggregated device count)
pub fn map_device_type_row(row: &SqliteRow) -> DeviceType {
    let policy_json: Option<String> = row.get("software_version_mgmt");
    let software_version_mgmt = policy_json.and_then(|s| match serde_json::from_str(&s) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Unreadable version policy on device type {}: {}", row.get::<i64, _>("id"), e);
            None
        }
    });
    DeviceType {
        id: row.get("id"),
        manufacturer_id: row.get("manufacturer_id"),
        manufacturer_slug: row.try_get::<Option<String>, _>("manufacturer_slug").ok().flatten(),
        model: row.get("model"),
        slug: row.get("slug"),
        software_version_mgmt,
        device_count: row.try_get("device_count").ok(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
