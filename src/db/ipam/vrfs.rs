use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use super::helpers::*;

// ========== VRF Repo ==========

const SELECT_VRF: &str = r#"
    SELECT v.*,
           COALESCE((SELECT COUNT(*) FROM ip_addresses WHERE vrf_id = v.id), 0) as ip_address_count
    FROM vrfs v
"#;

pub struct VrfRepo;

impl VrfRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Vrf>> {
        let rows = sqlx::query(&format!("{} ORDER BY v.name", SELECT_VRF))
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_vrf_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Vrf>> {
        let row = sqlx::query(&format!("{} WHERE v.id = ?", SELECT_VRF))
            .bind(id).fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_vrf_row))
    }

    /// First VRF with the given name (names are not unique)
    pub async fn find_by_name(pool: &Pool<Sqlite>, name: &str) -> Result<Option<Vrf>> {
        let row = sqlx::query(&format!("{} WHERE v.name = ? ORDER BY v.id LIMIT 1", SELECT_VRF))
            .bind(name).fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_vrf_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateVrfRequest) -> Result<Vrf> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO vrfs (name, rd, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(&req.name)
        .bind(req.rd.as_deref().unwrap_or(""))
        .bind(req.description.as_deref().unwrap_or(""))
        .bind(now).bind(now)
        .execute(pool).await?;
        let new_id = result.last_insert_rowid();
        Self::get(pool, new_id).await?.context("VRF not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateVrfRequest) -> Result<Vrf> {
        let result = sqlx::query("UPDATE vrfs SET name = ?, rd = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(&req.name)
            .bind(req.rd.as_deref().unwrap_or(""))
            .bind(req.description.as_deref().unwrap_or(""))
            .bind(Utc::now())
            .bind(id)
            .execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(crate::db::NotFoundError::new("VRF", &id.to_string()).into());
        }
        Self::get(pool, id).await?.context("VRF not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM vrfs WHERE id = ?").bind(id).execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(crate::db::NotFoundError::new("VRF", &id.to_string()).into());
        }
        Ok(())
    }
}
