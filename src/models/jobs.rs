use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical job run status values
pub mod job_status {
    pub const PENDING: &str = "pending";
    pub const RUNNING: &str = "running";
    pub const COMPLETED: &str = "completed";
    pub const ERRORED: &str = "errored";
}

/// Job kinds the runner knows how to execute
pub mod job_name {
    pub const SW_CURRENCY_REVIEW: &str = "sw_currency_review";
    pub const SW_CURRENCY_LINT: &str = "sw_currency_lint";

    pub const ALL: &[&str] = &[SW_CURRENCY_REVIEW, SW_CURRENCY_LINT];
}

fn default_manual() -> String {
    "manual".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLogEntry {
    pub message: String,
}

/// Job-scoped log sink, persisted as the run's `data` document (`{"log": [...]}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLog {
    #[serde(default)]
    pub log: Vec<JobLogEntry>,
}

impl JobLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(JobLogEntry {
            message: message.into(),
        });
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(|e| e.message.as_str())
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages().any(|m| m == message)
    }
}

/// JobRun records one execution of a scheduled or manually triggered job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
    pub id: String,
    pub name: String,
    pub status: String,
    pub data: JobLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default = "default_manual")]
    pub triggered_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRunRequest {
    pub name: String,
    #[serde(default = "default_manual")]
    pub triggered_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_log_serializes_as_message_list() {
        let mut log = JobLog::new();
        log.log("Version data passed lint check");
        let v = serde_json::to_value(&log).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"log": [{"message": "Version data passed lint check"}]})
        );
        assert!(log.contains("Version data passed lint check"));
    }

    #[test]
    fn test_job_log_tolerates_empty_document() {
        let log: JobLog = serde_json::from_str("{}").unwrap();
        assert!(log.log.is_empty());
    }
}
