//! Background job system: store, runner, and HTTP routes
pub mod domain;
pub mod infrastructure;
pub mod routes;
pub mod runner;

pub use domain::{JobRecord, JobStatus, JobType};
pub use infrastructure::InMemoryJobStore;
pub use runner::JobManager;
