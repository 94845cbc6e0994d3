//! Job manager: admits, schedules, and reconciles background workers
//!
//! One tokio task per accepted job. The manager promotes the job to Running
//! immediately before the worker body executes and records the terminal
//! outcome when the worker returns, errors, or panics. Nothing propagates to
//! the host process; callers observe everything by polling the store.
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::modules::jobs::domain::entities::{JobOutcome, JobStatus, JobType};
use crate::modules::jobs::domain::store::JobStore;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_error, log_info, log_warn};

pub struct JobManager {
    store: Arc<dyn JobStore>,
    admission: Arc<Semaphore>,
}

impl JobManager {
    pub fn new(store: Arc<dyn JobStore>, max_concurrent_jobs: usize) -> Self {
        Self {
            store,
            admission: Arc::new(Semaphore::new(max_concurrent_jobs)),
        }
    }

    pub fn store(&self) -> Arc<dyn JobStore> {
        Arc::clone(&self.store)
    }

    /// Create a job record and schedule its worker, returning the job id
    /// without waiting for completion. The worker factory receives the job
    /// id so it can report progress through the store.
    ///
    /// Rejects with a rate-limit error when the concurrency ceiling is
    /// reached; the caller retries later with a fresh submission.
    pub async fn submit<F, Fut>(
        &self,
        job_type: JobType,
        params: serde_json::Value,
        worker: F,
    ) -> AppResult<Uuid>
    where
        F: FnOnce(Uuid) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<serde_json::Value>> + Send + 'static,
    {
        let permit = self
            .admission
            .clone()
            .try_acquire_owned()
            .map_err(|_| {
                AppError::RateLimitError("Too many concurrent import jobs".to_string())
            })?;

        let job_id = self.store.create(job_type, params).await;
        log_info!("Job {} created (type: {})", job_id, job_type);

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            // Permit is held for the whole run; released on any exit path.
            let _permit = permit;

            store.transition(job_id, JobStatus::Running, None).await;

            // The worker runs on its own task so a panic surfaces as a join
            // error instead of killing this supervisor.
            let handle = tokio::spawn(worker(job_id));

            match handle.await {
                Ok(Ok(result)) => {
                    store
                        .transition(job_id, JobStatus::Completed, Some(JobOutcome::Result(result)))
                        .await;
                    log_info!("Job {} completed successfully", job_id);
                }
                Ok(Err(e)) => {
                    let message = e.to_string();
                    store
                        .transition(
                            job_id,
                            JobStatus::Failed,
                            Some(JobOutcome::Error(message.clone())),
                        )
                        .await;
                    log_warn!("Job {} failed: {}", job_id, message);
                }
                Err(join_error) => {
                    let message = format!("Worker panicked: {}", join_error);
                    store
                        .transition(
                            job_id,
                            JobStatus::Failed,
                            Some(JobOutcome::Error(message.clone())),
                        )
                        .await;
                    log_error!("Job {}: {}", job_id, message);
                }
            }
        });

        Ok(job_id)
    }

    /// Periodic cleanup sweep removing old terminal jobs.
    pub async fn run_cleanup_loop(self: Arc<Self>, max_age: std::time::Duration) {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(3600));
        // First tick fires immediately; skip it so a fresh boot does not
        // race the very first submissions.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = self.store.evict_older_than(max_age).await;
            if removed > 0 {
                log_info!("Cleanup sweep removed {} finished job(s)", removed);
            }
        }
    }
}
