// stereoflow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::core::job::{JobId, JobStatus};
use crate::core::stage::StageName;

/// Errors returned synchronously by the registry and the orchestrator.
#[derive(Debug, Error)]
pub enum JobError {
  /// Identifier collision on creation. Job ids are v4 UUIDs, so seeing this
  /// means a logic error somewhere upstream.
  #[error("Job already exists: {id}")]
  DuplicateId { id: JobId },

  #[error("Job not found: {id}")]
  NotFound { id: JobId },

  #[error("Job {id} is not ready (status: {status})")]
  NotReady { id: JobId, status: JobStatus },

  /// A second runner tried to claim a job that already has one.
  #[error("Job {id} already has a pipeline runner")]
  RunnerActive { id: JobId },

  #[error("Job {id} is already {status}")]
  AlreadyFinalized { id: JobId, status: JobStatus },

  #[error("No executor registered for stage: {stage}")]
  ExecutorMissing { stage: StageName },

  #[error("Internal stereoflow error: {0}")]
  Internal(String),
}

/// Failure reported by a stage executor. The `Display` output of this type
/// becomes the job's `error_message`.
#[derive(Debug, Error)]
pub enum ExecutorError {
  #[error("No frames extracted")]
  FrameExtractionEmpty,

  #[error("{stage} produced no usable output ({attempted} items attempted)")]
  NoUsableOutput { stage: StageName, attempted: usize },

  /// A plain failure message, surfaced verbatim.
  #[error("{0}")]
  Failed(String),

  #[error("{stage} executor panicked")]
  Panicked { stage: StageName },

  #[error(transparent)]
  Other(#[from] AnyhowError),
}

impl ExecutorError {
  pub fn failed(message: impl Into<String>) -> Self {
    ExecutorError::Failed(message.into())
  }
}

/// A stage failure as seen by the runner. Only ever logged; the job record
/// already carries the message by the time this is produced.
#[derive(Debug, Error)]
#[error("Pipeline for job {job_id} failed at stage {stage}: {source}")]
pub struct PipelineError {
  pub job_id: JobId,
  pub stage: StageName,
  #[source]
  pub source: ExecutorError,
}

pub type JobResult<T, E = JobError> = std::result::Result<T, E>;
