//! Job store abstraction
//!
//! The store is the single source of truth for job state. It is injected as
//! a trait so a durable or distributed backing store can replace the
//! in-process map without changing runner or worker code.
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::entities::{JobOutcome, JobRecord, JobStatus, JobType};

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Allocate a new Pending record and return its id. Never fails under
    /// normal operation.
    async fn create(&self, job_type: JobType, params: serde_json::Value) -> Uuid;

    /// Snapshot of the current record, or None if the id is unknown
    /// (including after cleanup eviction).
    async fn get(&self, job_id: Uuid) -> Option<JobRecord>;

    /// Overwrite the progress triple. Silent no-op if the job no longer
    /// exists (race with cleanup).
    async fn update_progress(&self, job_id: Uuid, current: u32, total: u32, message: &str);

    /// Atomically move the job's status, setting `started_at` on the Running
    /// transition and `result`/`error` plus `completed_at` on a terminal one.
    /// No-op if the job is missing or already terminal.
    async fn transition(&self, job_id: Uuid, status: JobStatus, outcome: Option<JobOutcome>);

    /// Recent jobs, newest-created first, bounded by `limit`.
    async fn list_recent(&self, limit: usize) -> Vec<JobRecord>;

    /// Remove terminal records whose `completed_at` is older than the cutoff.
    /// Pending/Running jobs are never evicted regardless of age.
    async fn evict_older_than(&self, max_age: Duration) -> usize;
}
