use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::models::*;

fn map_interface_row(row: &SqliteRow) -> Interface {
    Interface {
        id: row.get("id"),
        device_id: row.get("device_id"),
        device_name: row.try_get::<Option<String>, _>("device_name").ok().flatten(),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

const SELECT_INTERFACE: &str = r#"
    SELECT i.*, d.name as device_name
    FROM interfaces i
    LEFT JOIN devices d ON d.id = i.device_id
"#;

pub struct InterfaceRepo;

impl InterfaceRepo {
    pub async fn list_by_device(pool: &Pool<Sqlite>, device_id: i64) -> Result<Vec<Interface>> {
        let rows = sqlx::query(&format!("{} WHERE i.device_id = ? ORDER BY i.name", SELECT_INTERFACE))
            .bind(device_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_interface_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Interface>> {
        let row = sqlx::query(&format!("{} WHERE i.id = ?", SELECT_INTERFACE))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_interface_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateInterfaceRequest) -> Result<Interface> {
        let result = sqlx::query("INSERT INTO interfaces (device_id, name, created_at) VALUES (?, ?, ?)")
            .bind(req.device_id)
            .bind(&req.name)
            .bind(Utc::now())
            .execute(pool)
            .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Interface not found after creation")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM interfaces WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Interface", &id.to_string()).into());
        }
        Ok(())
    }
}
