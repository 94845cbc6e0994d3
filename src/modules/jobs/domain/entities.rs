//! Domain entities for the background job system
//!
//! A job is one tracked unit of asynchronous import work: it carries an id,
//! a state, coarse progress, and a terminal outcome (result or error).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

/// Job type enum, tags which worker logic applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    ExternalMealImport,
    BatchSiteImport,
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobType::ExternalMealImport => write!(f, "external_meal_import"),
            JobType::BatchSiteImport => write!(f, "batch_site_import"),
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "external_meal_import" => Ok(JobType::ExternalMealImport),
            "batch_site_import" => Ok(JobType::BatchSiteImport),
            _ => Err(format!("Invalid job type: {}", s)),
        }
    }
}

/// Coarse completion fraction plus a human-readable status line.
/// Updates are last-write-wins overwrites, never accumulations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    pub current: u32,
    pub total: u32,
    pub message: String,
}

impl JobProgress {
    pub fn initial() -> Self {
        Self {
            current: 0,
            total: 0,
            message: "Job created".to_string(),
        }
    }
}

/// Terminal outcome of a job: a structured result or an error message.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Result(serde_json::Value),
    Error(String),
}

/// Tracked job record. `result` and `error` are mutually exclusive and both
/// empty while the job is not terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub job_type: JobType,
    pub status: JobStatus,
    pub params: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress: JobProgress,
}

impl JobRecord {
    pub fn new(job_type: JobType, params: serde_json::Value) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            job_type,
            status: JobStatus::Pending,
            params,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            progress: JobProgress::initial(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_display() {
        assert_eq!(JobStatus::Pending.to_string(), "pending");
        assert_eq!(JobStatus::Running.to_string(), "running");
        assert_eq!(JobStatus::Completed.to_string(), "completed");
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_job_status_from_str() {
        assert_eq!("pending".parse::<JobStatus>().unwrap(), JobStatus::Pending);
        assert_eq!("RUNNING".parse::<JobStatus>().unwrap(), JobStatus::Running);
        assert!("invalid".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_job_type_round_trip() {
        assert_eq!(
            "external_meal_import".parse::<JobType>().unwrap(),
            JobType::ExternalMealImport
        );
        assert_eq!(
            JobType::BatchSiteImport.to_string(),
            "batch_site_import"
        );
        assert!("mystery_import".parse::<JobType>().is_err());
    }

    #[test]
    fn test_new_record_is_pending_with_empty_progress() {
        let record = JobRecord::new(JobType::ExternalMealImport, serde_json::json!({"count": 1}));

        assert_eq!(record.status, JobStatus::Pending);
        assert_eq!(record.progress.current, 0);
        assert_eq!(record.progress.total, 0);
        assert!(record.result.is_none());
        assert!(record.error.is_none());
        assert!(record.started_at.is_none());
        assert!(record.completed_at.is_none());
    }
}
