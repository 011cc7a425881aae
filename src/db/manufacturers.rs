use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::models::*;
use crate::utils;

fn map_manufacturer_row(row: &SqliteRow) -> Manufacturer {
    Manufacturer {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        device_type_count: row.try_get("device_type_count").ok(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_MANUFACTURER: &str = r#"
    SELECT m.*,
           (SELECT COUNT(*) FROM device_types dt WHERE dt.manufacturer_id = m.id) as device_type_count
    FROM manufacturers m
"#;

pub struct ManufacturerRepo;

impl ManufacturerRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Manufacturer>> {
        let rows = sqlx::query(&format!("{} ORDER BY m.name", SELECT_MANUFACTURER))
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_manufacturer_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Manufacturer>> {
        let row = sqlx::query(&format!("{} WHERE m.id = ?", SELECT_MANUFACTURER))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_manufacturer_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateManufacturerRequest) -> Result<Manufacturer> {
        let now = Utc::now();
        let slug = utils::slug_or_default(req.slug.as_deref(), &req.name);
        let result = sqlx::query(
            "INSERT INTO manufacturers (name, slug, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&req.name)
        .bind(&slug)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Manufacturer not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateManufacturerRequest) -> Result<Manufacturer> {
        let slug = utils::slug_or_default(req.slug.as_deref(), &req.name);
        let result = sqlx::query("UPDATE manufacturers SET name = ?, slug = ?, updated_at = ? WHERE id = ?")
            .bind(&req.name)
            .bind(&slug)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Manufacturer", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Manufacturer not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM manufacturers WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Manufacturer", &id.to_string()).into());
        }
        Ok(())
    }
}
