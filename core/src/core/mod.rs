pub mod job;
pub mod stage;

// Re-export key types for easier access from other modules (and lib.rs)
pub use job::{Job, JobId, JobStatus, JobSummary, Outcome};
pub use stage::{Stage, StageName, StageStatus};
