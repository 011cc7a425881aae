use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::models::*;
use crate::utils;

fn map_tag_row(row: &SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        color: row.get("color"),
        created_at: row.get("created_at"),
    }
}

pub struct TagRepo;

impl TagRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT * FROM tags ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_tag_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT * FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_tag_row))
    }

    pub async fn get_by_slug(pool: &Pool<Sqlite>, slug: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT * FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_tag_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateTagRequest) -> Result<Tag> {
        let slug = utils::slug_or_default(req.slug.as_deref(), &req.name);
        let result = sqlx::query("INSERT INTO tags (name, slug, color, created_at) VALUES (?, ?, ?, ?)")
            .bind(&req.name)
            .bind(&slug)
            .bind(&req.color)
            .bind(Utc::now())
            .execute(pool)
            .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Tag not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &CreateTagRequest) -> Result<Tag> {
        let slug = utils::slug_or_default(req.slug.as_deref(), &req.name);
        let result = sqlx::query("UPDATE tags SET name = ?, slug = ?, color = ? WHERE id = ?")
            .bind(&req.name)
            .bind(&slug)
            .bind(&req.color)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Tag", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Tag not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Tag", &id.to_string()).into());
        }
        Ok(())
    }
}
