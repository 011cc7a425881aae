use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

use super::row_helpers::map_device_row;

const SELECT_DEVICE: &str = r#"
    SELECT d.id, d.name, d.device_type_id, d.role_id, d.tenant_id,
           d.primary_ip4_id, d.primary_ip6_id, d.custom_field_data,
           d.created_at, d.updated_at,
           dt.model as device_type_model,
           m.slug as manufacturer_slug,
           r.slug as role_slug
    FROM devices d
    LEFT JOIN device_types dt ON dt.id = d.device_type_id
    LEFT JOIN manufacturers m ON m.id = dt.manufacturer_id
    LEFT JOIN device_roles r ON r.id = d.role_id
"#;

/// Device database operations
pub struct DeviceRepo;

impl DeviceRepo {
    pub async fn list_paged(pool: &Pool<Sqlite>, limit: i32, offset: i32) -> Result<Vec<Device>> {
        let rows = sqlx::query(&format!("{} ORDER BY d.name LIMIT ? OFFSET ?", SELECT_DEVICE))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(rows.iter().map(map_device_row).collect())
    }

    /// Instances of a device type that have a primary IPv4 address assigned
    pub async fn list_by_type_with_primary_ip4(pool: &Pool<Sqlite>, device_type_id: i64) -> Result<Vec<Device>> {
        let rows = sqlx::query(&format!(
            "{} WHERE d.device_type_id = ? AND d.primary_ip4_id IS NOT NULL ORDER BY d.name",
            SELECT_DEVICE
        ))
        .bind(device_type_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.iter().map(map_device_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Device>> {
        let row = sqlx::query(&format!("{} WHERE d.id = ?", SELECT_DEVICE))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.as_ref().map(map_device_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateDeviceRequest) -> Result<Device> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO devices (name, device_type_id, role_id, tenant_id, primary_ip4_id, primary_ip6_id,
                                 custom_field_data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&req.name)
        .bind(req.device_type_id)
        .bind(req.role_id)
        .bind(req.tenant_id)
        .bind(req.primary_ip4_id)
        .bind(req.primary_ip6_id)
        .bind(serde_json::to_string(&req.custom_fields)?)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Device not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateDeviceRequest) -> Result<Device> {
        let result = sqlx::query(
            r#"
            UPDATE devices SET name = ?, device_type_id = ?, role_id = ?, tenant_id = ?,
                              primary_ip4_id = ?, primary_ip6_id = ?, custom_field_data = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(req.device_type_id)
        .bind(req.role_id)
        .bind(req.tenant_id)
        .bind(req.primary_ip4_id)
        .bind(req.primary_ip6_id)
        .bind(serde_json::to_string(&req.custom_fields)?)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Device not found after update")
    }

    /// Persist only the custom field document of a device
    pub async fn save_custom_fields(pool: &Pool<Sqlite>, id: i64, fields: &SoftwareFields) -> Result<()> {
        let result = sqlx::query("UPDATE devices SET custom_field_data = ?, updated_at = ? WHERE id = ?")
            .bind(serde_json::to_string(fields)?)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device", &id.to_string()).into());
        }
        Ok(())
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM devices WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device", &id.to_string()).into());
        }
        Ok(())
    }
}
