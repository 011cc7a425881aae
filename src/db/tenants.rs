use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::models::*;
use crate::utils;
use super::row_helpers::none_if_empty;

fn map_tenant_row(row: &SqliteRow) -> Tenant {
    Tenant {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        description: none_if_empty(row.get("description")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Tenant slugs are the keys of the tenant-to-tag mapping, so they are
/// always stored, derived from the name when the request leaves them out.
pub struct TenantRepo;

impl TenantRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Tenant>> {
        let rows = sqlx::query("SELECT * FROM tenants ORDER BY slug")
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_tenant_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Tenant>> {
        let row = sqlx::query("SELECT * FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_tenant_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateTenantRequest) -> Result<Tenant> {
        let now = Utc::now();
        let new_id: i64 = sqlx::query_scalar(
            "INSERT INTO tenants (name, slug, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&req.name)
        .bind(utils::slug_or_default(req.slug.as_deref(), &req.name))
        .bind(req.description.as_deref().unwrap_or_default())
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Self::get(pool, new_id)
            .await?
            .context("Tenant not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateTenantRequest) -> Result<Tenant> {
        let updated = sqlx::query(
            "UPDATE tenants SET name = ?, slug = ?, description = ?, updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(&req.name)
        .bind(utils::slug_or_default(req.slug.as_deref(), &req.name))
        .bind(req.description.as_deref().unwrap_or_default())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?;

        updated
            .as_ref()
            .map(map_tenant_row)
            .ok_or_else(|| super::NotFoundError::new("Tenant", &id.to_string()).into())
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Tenant", &id.to_string()).into());
        }
        Ok(())
    }
}
