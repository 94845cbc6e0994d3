pub mod entities;
pub mod store;

pub use entities::{JobOutcome, JobProgress, JobRecord, JobStatus, JobType};
pub use store::JobStore;
