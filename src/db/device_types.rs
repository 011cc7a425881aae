use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use crate::utils;

use super::row_helpers::map_device_type_row;

const SELECT_DEVICE_TYPE: &str = r#"
    SELECT dt.id, dt.manufacturer_id, dt.model, dt.slug, dt.software_version_mgmt,
           dt.created_at, dt.updated_at,
           m.slug as manufacturer_slug,
           (SELECT COUNT(*) FROM devices d WHERE d.device_type_id = dt.id) as device_count
    FROM device_types dt
    LEFT JOIN manufacturers m ON m.id = dt.manufacturer_id
"#;

fn policy_json(req: &CreateDeviceTypeRequest) -> Result<Option<String>> {
    req.software_version_mgmt
        .as_ref()
        .filter(|v| !v.is_null())
        .map(serde_json::to_string)
        .transpose()
        .context("Failed to encode version policy")
}

pub struct DeviceTypeRepo;

impl DeviceTypeRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<DeviceType>> {
        let rows = sqlx::query(&format!("{} ORDER BY m.slug, dt.model", SELECT_DEVICE_TYPE))
            .fetch_all(pool)
            .await?;

        Ok(rows.iter().map(map_device_type_row).collect())
    }

    /// Device types that carry a version policy blob
    pub async fn list_with_policy(pool: &Pool<Sqlite>) -> Result<Vec<DeviceType>> {
        let rows = sqlx::query(&format!(
            "{} WHERE dt.software_version_mgmt IS NOT NULL ORDER BY m.slug, dt.model",
            SELECT_DEVICE_TYPE
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows.iter().map(map_device_type_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<DeviceType>> {
        let row = sqlx::query(&format!("{} WHERE dt.id = ?", SELECT_DEVICE_TYPE))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.as_ref().map(map_device_type_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateDeviceTypeRequest) -> Result<DeviceType> {
        let now = Utc::now();
        let slug = utils::slug_or_default(req.slug.as_deref(), &req.model);

        let result = sqlx::query(
            r#"
            INSERT INTO device_types (manufacturer_id, model, slug, software_version_mgmt, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(req.manufacturer_id)
        .bind(&req.model)
        .bind(&slug)
        .bind(policy_json(req)?)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Device type not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateDeviceTypeRequest) -> Result<DeviceType> {
        let slug = utils::slug_or_default(req.slug.as_deref(), &req.model);

        let result = sqlx::query(
            r#"
            UPDATE device_types SET manufacturer_id = ?, model = ?, slug = ?, software_version_mgmt = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(req.manufacturer_id)
        .bind(&req.model)
        .bind(&slug)
        .bind(policy_json(req)?)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device type", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Device type not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM device_types WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device type", &id.to_string()).into());
        }
        Ok(())
    }
}
