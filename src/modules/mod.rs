pub mod catalog;
pub mod import;
pub mod jobs;
