//! In-process job store backed by a concurrent map
//!
//! Per-entry locking gives atomic mutation; reads clone a snapshot so a
//! caller never observes a torn record.
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::modules::jobs::domain::entities::{JobOutcome, JobRecord, JobStatus, JobType};
use crate::modules::jobs::domain::store::JobStore;

#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<Uuid, JobRecord>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job_type: JobType, params: serde_json::Value) -> Uuid {
        let record = JobRecord::new(job_type, params);
        let job_id = record.job_id;
        self.jobs.insert(job_id, record);
        job_id
    }

    async fn get(&self, job_id: Uuid) -> Option<JobRecord> {
        self.jobs.get(&job_id).map(|entry| entry.clone())
    }

    async fn update_progress(&self, job_id: Uuid, current: u32, total: u32, message: &str) {
        if let Some(mut entry) = self.jobs.get_mut(&job_id) {
            entry.progress.current = current;
            entry.progress.total = total;
            entry.progress.message = message.to_string();
        }
    }

    async fn transition(&self, job_id: Uuid, status: JobStatus, outcome: Option<JobOutcome>) {
        let Some(mut entry) = self.jobs.get_mut(&job_id) else {
            return;
        };
        // Terminal states are final; a retry is a new job.
        if entry.status.is_terminal() {
            return;
        }

        match status {
            JobStatus::Pending => {}
            JobStatus::Running => {
                if entry.started_at.is_none() {
                    entry.status = JobStatus::Running;
                    entry.started_at = Some(Utc::now());
                }
            }
            JobStatus::Completed | JobStatus::Failed => {
                entry.status = status;
                entry.completed_at = Some(Utc::now());
                match outcome {
                    Some(JobOutcome::Result(value)) => entry.result = Some(value),
                    Some(JobOutcome::Error(message)) => entry.error = Some(message),
                    None => {}
                }
            }
        }
    }

    async fn list_recent(&self, limit: usize) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = self.jobs.iter().map(|entry| entry.clone()).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit);
        jobs
    }

    async fn evict_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::hours(24));

        let before = self.jobs.len();
        self.jobs.retain(|_, job| {
            let expired = job.status.is_terminal()
                && job
                    .completed_at
                    .map(|completed| completed < cutoff)
                    .unwrap_or(false);
            !expired
        });
        before - self.jobs.len()
    }
}
