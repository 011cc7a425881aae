use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::models::*;
use crate::utils;

// ========== Row Mapper ==========

fn map_device_role_row(row: &SqliteRow) -> DeviceRole {
    DeviceRole {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        device_count: row.try_get("device_count").ok(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_DEVICE_ROLE: &str = r#"
    SELECT r.*,
           (SELECT COUNT(*) FROM devices d WHERE d.role_id = r.id) as device_count
    FROM device_roles r
"#;

// ========== Device Role Repo ==========

pub struct DeviceRoleRepo;

impl DeviceRoleRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<DeviceRole>> {
        let rows = sqlx::query(&format!("{} ORDER BY r.name", SELECT_DEVICE_ROLE))
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_device_role_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<DeviceRole>> {
        let row = sqlx::query(&format!("{} WHERE r.id = ?", SELECT_DEVICE_ROLE))
            .bind(id).fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_device_role_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateDeviceRoleRequest) -> Result<DeviceRole> {
        let now = Utc::now();
        let slug = utils::slug_or_default(req.slug.as_deref(), &req.name);
        let result = sqlx::query(
            "INSERT INTO device_roles (name, slug, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&req.name)
        .bind(&slug)
        .bind(now)
        .bind(now)
        .execute(pool).await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Device role not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateDeviceRoleRequest) -> Result<DeviceRole> {
        let slug = utils::slug_or_default(req.slug.as_deref(), &req.name);
        let result = sqlx::query("UPDATE device_roles SET name = ?, slug = ?, updated_at = ? WHERE id = ?")
            .bind(&req.name)
            .bind(&slug)
            .bind(Utc::now())
            .bind(id)
            .execute(pool).await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device role", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Device role not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM device_roles WHERE id = ?")
            .bind(id).execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device role", &id.to_string()).into());
        }
        Ok(())
    }
}
