use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::models::*;

fn map_job_run_row(row: &SqliteRow) -> JobRun {
    let id: String = row.get("id");
    let raw: String = row.get("data");
    let data = serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!("Job run {} has unreadable log data: {}", id, e);
        JobLog::new()
    });
    JobRun {
        id,
        name: row.get("name"),
        status: row.get("status"),
        data,
        error: row.get("error"),
        triggered_by: row.get("triggered_by"),
        created_at: row.get("created_at"),
        started_at: row.get("started_at"),
        completed_at: row.get("completed_at"),
    }
}

const SELECT_JOB_RUN: &str = r#"
    SELECT id, name, status, data, error, triggered_by,
           created_at, started_at, completed_at
    FROM job_runs
"#;

pub struct JobRunRepo;

impl JobRunRepo {
    pub async fn create(pool: &Pool<Sqlite>, id: &str, req: &CreateJobRunRequest) -> Result<JobRun> {
        sqlx::query(
            r#"
            INSERT INTO job_runs (id, name, status, data, triggered_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(job_status::PENDING)
        .bind(serde_json::to_string(&JobLog::new())?)
        .bind(&req.triggered_by)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Self::get(pool, id)
            .await?
            .context("Job run not found after creation")
    }

    pub async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<JobRun>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_JOB_RUN))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_job_run_row))
    }

    pub async fn list_recent(pool: &Pool<Sqlite>, limit: i32) -> Result<Vec<JobRun>> {
        let rows = sqlx::query(&format!("{} ORDER BY created_at DESC LIMIT ?", SELECT_JOB_RUN))
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_job_run_row).collect())
    }

    pub async fn mark_running(pool: &Pool<Sqlite>, id: &str) -> Result<()> {
        sqlx::query("UPDATE job_runs SET status = ?, started_at = ? WHERE id = ?")
            .bind(job_status::RUNNING)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn mark_completed(pool: &Pool<Sqlite>, id: &str, data: &JobLog) -> Result<()> {
        sqlx::query("UPDATE job_runs SET status = ?, data = ?, completed_at = ? WHERE id = ?")
            .bind(job_status::COMPLETED)
            .bind(serde_json::to_string(data)?)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn mark_errored(pool: &Pool<Sqlite>, id: &str, data: &JobLog, error: &str) -> Result<()> {
        sqlx::query("UPDATE job_runs SET status = ?, data = ?, error = ?, completed_at = ? WHERE id = ?")
            .bind(job_status::ERRORED)
            .bind(serde_json::to_string(data)?)
            .bind(error)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Marks runs left pending or running by a previous process as errored
    pub async fn fail_stuck(pool: &Pool<Sqlite>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE job_runs SET status = ?, error = ?, completed_at = ? WHERE status IN (?, ?)",
        )
        .bind(job_status::ERRORED)
        .bind("Interrupted by server restart")
        .bind(Utc::now())
        .bind(job_status::PENDING)
        .bind(job_status::RUNNING)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
