use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::models::*;
use super::ipam::resolve_tag_ids;
use super::row_helpers::csv_to_vec;

fn map_entnet_row(row: &SqliteRow) -> EntNet {
    EntNet {
        id: row.get("id"),
        name: row.get("name"),
        tags: csv_to_vec(row.try_get::<Option<String>, _>("tag_slugs_csv").ok().flatten()),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_ENTNET: &str = r#"
    SELECT e.*,
           (SELECT GROUP_CONCAT(t.slug, ',') FROM entnet_tags et JOIN tags t ON t.id = et.tag_id
             WHERE et.entnet_id = e.id) as tag_slugs_csv
    FROM entnets e
"#;

pub struct EntNetRepo;

impl EntNetRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<EntNet>> {
        let rows = sqlx::query(&format!("{} ORDER BY e.name", SELECT_ENTNET))
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_entnet_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<EntNet>> {
        let row = sqlx::query(&format!("{} WHERE e.id = ?", SELECT_ENTNET))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_entnet_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateEntNetRequest) -> Result<EntNet> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        let tag_ids = resolve_tag_ids(&mut tx, &req.tags).await?;

        let result = sqlx::query("INSERT INTO entnets (name, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(&req.name)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        let new_id = result.last_insert_rowid();

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO entnet_tags (entnet_id, tag_id) VALUES (?, ?)")
                .bind(new_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Self::get(pool, new_id)
            .await?
            .context("EntNet not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateEntNetRequest) -> Result<EntNet> {
        let mut tx = pool.begin().await?;
        let tag_ids = resolve_tag_ids(&mut tx, &req.tags).await?;

        let result = sqlx::query("UPDATE entnets SET name = ?, updated_at = ? WHERE id = ?")
            .bind(&req.name)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("EntNet", &id.to_string()).into());
        }

        sqlx::query("DELETE FROM entnet_tags WHERE entnet_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO entnet_tags (entnet_id, tag_id) VALUES (?, ?)")
                .bind(id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Self::get(pool, id)
            .await?
            .context("EntNet not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM entnets WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("EntNet", &id.to_string()).into());
        }
        Ok(())
    }
}
