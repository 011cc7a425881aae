pub mod sw_currency;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::db::{Store, ValidationError};
use crate::models::*;

/// JobService records and executes software currency runs, one at a time
pub struct JobService {
    store: Store,
    pending_tx: mpsc::Sender<String>,
}

impl JobService {
    /// Fail runs interrupted by a previous crash, then start the worker
    pub async fn new(store: Store) -> Result<Arc<Self>> {
        let stuck = store.fail_stuck_job_runs().await?;
        if stuck > 0 {
            tracing::info!("Marked {} interrupted job runs as errored", stuck);
        }

        let (pending_tx, pending_rx) = mpsc::channel(100);
        let service = Arc::new(Self { store, pending_tx });

        let worker_service = service.clone();
        tokio::spawn(async move {
            worker_service.worker(pending_rx).await;
        });

        Ok(service)
    }

    /// Record a pending run and queue it for the worker
    pub async fn enqueue(&self, name: &str, triggered_by: &str) -> Result<JobRun> {
        if !job_name::ALL.contains(&name) {
            return Err(ValidationError::new(format!("Unknown job: {}", name)).into());
        }

        let run_id = uuid::Uuid::new_v4().to_string();
        let req = CreateJobRunRequest {
            name: name.to_string(),
            triggered_by: triggered_by.to_string(),
        };
        let run = self.store.create_job_run(&run_id, &req).await?;

        if let Err(e) = self.pending_tx.send(run_id.clone()).await {
            tracing::warn!("Failed to submit job run {}: {}", run_id, e);
        }
        Ok(run)
    }

    /// Start the cron scheduler for the software currency review
    pub fn start_scheduler(self: &Arc<Self>, schedule: &str) -> Result<()> {
        use croner::Cron;
        use std::time::Duration;

        let cron = Cron::new(schedule)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid cron expression '{}': {}", schedule, e))?;
        tracing::info!("Software currency review scheduled: {}", schedule);

        let svc = self.clone();
        tokio::spawn(async move {
            let mut last_run = chrono::Utc::now();
            let mut interval = tokio::time::interval(Duration::from_secs(30));
            loop {
                interval.tick().await;

                let now = chrono::Utc::now();
                let next = match cron.find_next_occurrence(&last_run, false) {
                    Ok(n) => n,
                    Err(e) => {
                        tracing::warn!("Scheduler: no next occurrence: {}", e);
                        continue;
                    }
                };
                if next > now {
                    continue;
                }

                last_run = now;
                tracing::info!("Scheduler: queueing {}", job_name::SW_CURRENCY_REVIEW);
                if let Err(e) = svc.enqueue(job_name::SW_CURRENCY_REVIEW, "schedule").await {
                    tracing::error!("Scheduler: failed to queue review: {}", e);
                }
            }
        });
        Ok(())
    }

    async fn worker(&self, mut rx: mpsc::Receiver<String>) {
        while let Some(run_id) = rx.recv().await {
            if let Err(e) = self.process_run(&run_id).await {
                tracing::error!("Job run {} processing error: {}", run_id, e);
            }
        }
    }

    async fn process_run(&self, run_id: &str) -> Result<()> {
        let run = match self.store.get_job_run(run_id).await? {
            Some(r) => r,
            None => {
                tracing::warn!("Job run {} not found, skipping", run_id);
                return Ok(());
            }
        };

        self.store.mark_job_running(run_id).await?;

        let mut log = JobLog::new();
        let result = match run.name.as_str() {
            job_name::SW_CURRENCY_REVIEW => sw_currency::process_device_version_info(&self.store, &mut log)
                .await
                .map(|_| ()),
            job_name::SW_CURRENCY_LINT => sw_currency::lint_device_version_info(&self.store, &mut log).await,
            other => Err(anyhow::anyhow!("Unknown job: {}", other)),
        };

        match result {
            Ok(()) => {
                self.store.mark_job_completed(run_id, &log).await?;
                tracing::info!("Job run {} ({}) completed", run_id, run.name);
            }
            Err(e) => {
                tracing::warn!("Job {} encountered a warning", run.name);
                tracing::error!("{}", e);
                self.store.mark_job_errored(run_id, &log, &e.to_string()).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use std::time::Duration;

    async fn wait_for_finish(store: &Store, run_id: &str) -> JobRun {
        for _ in 0..100 {
            let run = store.get_job_run(run_id).await.unwrap().unwrap();
            if run.status == job_status::COMPLETED || run.status == job_status::ERRORED {
                return run;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("job run {} did not finish", run_id);
    }

    #[tokio::test]
    async fn test_enqueue_lint_completes_with_log() {
        let store = Store::in_memory().await.unwrap();
        let mfr = fixtures::manufacturer(&store, "cisco").await;
        fixtures::device_type(&store, mfr.id, "C9300", Some(fixtures::sample_policy())).await;

        let svc = JobService::new(store.clone()).await.unwrap();
        let run = svc.enqueue(job_name::SW_CURRENCY_LINT, "manual").await.unwrap();
        assert_eq!(run.status, job_status::PENDING);

        let run = wait_for_finish(&store, &run.id).await;
        assert_eq!(run.status, job_status::COMPLETED);
        assert!(run.data.contains("Device-Type: C9300 - Linting version data"));
        assert!(run.data.contains("Version data passed lint check"));
    }

    #[tokio::test]
    async fn test_enqueue_rejects_unknown_job() {
        let store = Store::in_memory().await.unwrap();
        let svc = JobService::new(store).await.unwrap();
        let err = svc.enqueue("reboot_everything", "manual").await.unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[tokio::test]
    async fn test_unknown_job_marked_errored() {
        let store = Store::in_memory().await.unwrap();
        let svc = JobService::new(store.clone()).await.unwrap();
        let req = CreateJobRunRequest {
            name: "legacy_job".to_string(),
            triggered_by: "manual".to_string(),
        };
        store.create_job_run("r1", &req).await.unwrap();

        svc.process_run("r1").await.unwrap();

        let run = store.get_job_run("r1").await.unwrap().unwrap();
        assert_eq!(run.status, job_status::ERRORED);
        assert_eq!(run.error.as_deref(), Some("Unknown job: legacy_job"));
    }

    #[tokio::test]
    async fn test_review_failure_marks_run_errored_and_keeps_log() {
        let store = Store::in_memory().await.unwrap();
        let role = fixtures::role(&store, "access").await;
        let ip = fixtures::ip_address(&store, &fixtures::ip_request("10.0.0.1/24")).await;
        let mut device_ids = Vec::new();
        for (mfr, model, name) in [("cisco", "C9300", "sw1"), ("juniper", "EX4300", " ")] {
            let mfr = fixtures::manufacturer(&store, mfr).await;
            let dt = fixtures::device_type(&store, mfr.id, model, Some(fixtures::sample_policy())).await;
            let mut req = fixtures::device_request(name, dt.id, role.id);
            req.custom_fields.software_version = Some("15.1".to_string());
            req.primary_ip4_id = Some(ip.id);
            device_ids.push(fixtures::device(&store, &req).await.id);
        }

        let svc = JobService::new(store.clone()).await.unwrap();
        let req = CreateJobRunRequest {
            name: job_name::SW_CURRENCY_REVIEW.to_string(),
            triggered_by: "manual".to_string(),
        };
        store.create_job_run("r1", &req).await.unwrap();
        svc.process_run("r1").await.unwrap();

        let run = store.get_job_run("r1").await.unwrap().unwrap();
        assert_eq!(run.status, job_status::ERRORED);
        assert!(run.error.as_deref().unwrap_or_default().contains("has no name"));
        assert!(run.data.contains("[sw1] Updating 'software_version_target': [None] -> [17.9]"));

        let written = store.get_device(device_ids[0]).await.unwrap().unwrap();
        assert_eq!(
            written.custom_fields.software_currency_status.as_deref(),
            Some("UPGRADE_REQUIRED_RETIRED")
        );
    }

    #[tokio::test]
    async fn test_new_fails_interrupted_runs() {
        let store = Store::in_memory().await.unwrap();
        let req = CreateJobRunRequest {
            name: job_name::SW_CURRENCY_REVIEW.to_string(),
            triggered_by: "schedule".to_string(),
        };
        store.create_job_run("stale", &req).await.unwrap();
        store.mark_job_running("stale").await.unwrap();

        JobService::new(store.clone()).await.unwrap();

        let run = store.get_job_run("stale").await.unwrap().unwrap();
        assert_eq!(run.status, job_status::ERRORED);
    }

    #[tokio::test]
    async fn test_invalid_schedule_rejected() {
        let store = Store::in_memory().await.unwrap();
        let svc = JobService::new(store).await.unwrap();
        assert!(svc.start_scheduler("not a cron").is_err());
        assert!(svc.start_scheduler("0 * * * *").is_ok());
    }
}
