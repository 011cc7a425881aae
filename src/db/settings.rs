use anyhow::Result;
use sqlx::{Pool, Sqlite};

use crate::models::*;

/// Plugin settings are a single JSON document in row id = 1
pub struct SettingsRepo;

impl SettingsRepo {
    pub async fn get(pool: &Pool<Sqlite>) -> Result<PluginSettings> {
        let row: (String,) = sqlx::query_as("SELECT data FROM settings WHERE id = 1")
            .fetch_one(pool)
            .await?;
        Ok(serde_json::from_str(&row.0)?)
    }

    pub async fn update(pool: &Pool<Sqlite>, settings: &PluginSettings) -> Result<()> {
        let data = serde_json::to_string(settings)?;
        sqlx::query("UPDATE settings SET data = ? WHERE id = 1")
            .bind(&data)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn ensure_defaults(pool: &Pool<Sqlite>) -> Result<()> {
        let count: (i32,) = sqlx::query_as("SELECT COUNT(*) FROM settings")
            .fetch_one(pool)
            .await?;

        if count.0 == 0 {
            let data = serde_json::to_string(&PluginSettings::default())?;
            sqlx::query("INSERT INTO settings (id, data) VALUES (1, ?)")
                .bind(&data)
                .execute(pool)
                .await?;
        }
        Ok(())
    }
}
