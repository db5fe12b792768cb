// stereoflow/src/registry.rs

//! Defines `JobRegistry`, the concurrency-safe, in-memory map of job records.
//! It is the only shared mutable state of the orchestrator: every write goes
//! through one of its methods and every read returns a whole-job snapshot.

use crate::artifact::ArtifactRef;
use crate::core::job::{Job, JobId, JobStatus, JobSummary, Outcome};
use crate::core::stage::{StageName, StageStatus};
use crate::error::{JobError, JobResult};

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::Notify;
use tracing::{event, instrument, Level};

/// Job records keyed by id. Records are never evicted.
///
/// Lock guards are plain `parking_lot` guards; no method holds one across an
/// `.await`.
#[derive(Debug, Default)]
pub struct JobRegistry {
  jobs: RwLock<HashMap<JobId, Job>>,
  finalized: Notify,
}

impl JobRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts a fresh job with every stage `Pending` at 0%.
  #[instrument(name = "JobRegistry::create", skip(self, id, input), fields(job_id = %id), err(Display))]
  pub fn create(&self, id: JobId, input: ArtifactRef) -> JobResult<Job> {
    let mut jobs = self.jobs.write();
    if jobs.contains_key(&id) {
      event!(Level::ERROR, "Refusing to overwrite an existing job record.");
      return Err(JobError::DuplicateId { id });
    }
    let job = Job::new(id, input, Utc::now());
    jobs.insert(id, job.clone());
    event!(Level::DEBUG, total_jobs = jobs.len(), "Job registered.");
    Ok(job)
  }

  /// Snapshot of the current record.
  pub fn get(&self, id: JobId) -> Option<Job> {
    self.jobs.read().get(&id).cloned()
  }

  /// Last recorded progress of one stage.
  pub fn stage_progress(&self, id: JobId, stage: StageName) -> Option<f32> {
    self.jobs.read().get(&id).and_then(|job| job.stage(stage)).map(|s| s.progress)
  }

  /// Atomically overwrites one stage's progress and status.
  ///
  /// Progress is clamped to `[0, 100]`; non-finite values are dropped.
  /// Writes against a terminal stage or a terminal job are ignored, so a
  /// `Completed` stage never regresses and late progress callbacks are
  /// harmless.
  pub fn mutate_stage(&self, id: JobId, stage: StageName, progress: f32, status: StageStatus) -> JobResult<()> {
    if !progress.is_finite() {
      event!(Level::WARN, job_id = %id, %stage, progress, "Dropping non-finite progress value.");
      return Ok(());
    }
    let progress = progress.clamp(0.0, 100.0);

    let mut jobs = self.jobs.write();
    let job = jobs.get_mut(&id).ok_or(JobError::NotFound { id })?;
    if job.status.is_terminal() {
      event!(Level::TRACE, job_id = %id, %stage, "Ignoring stage write on a terminal job.");
      return Ok(());
    }
    let Some(record) = job.stage_mut(stage) else {
      return Ok(());
    };
    if record.status.is_terminal() {
      event!(Level::TRACE, job_id = %id, %stage, current = ?record.status, "Ignoring write on a terminal stage.");
      return Ok(());
    }
    record.progress = progress;
    record.status = status;
    job.touch(Utc::now());
    Ok(())
  }

  /// Marks one stage `Failed`, keeping whatever progress it last recorded.
  ///
  /// Reading and writing happen under the same lock, so a concurrent progress
  /// report is either kept or rejected, never overwritten by a stale value.
  pub fn fail_stage(&self, id: JobId, stage: StageName) -> JobResult<f32> {
    let mut jobs = self.jobs.write();
    let job = jobs.get_mut(&id).ok_or(JobError::NotFound { id })?;
    if job.status.is_terminal() {
      event!(Level::TRACE, job_id = %id, %stage, "Ignoring stage failure on a terminal job.");
      return Ok(job.stage(stage).map(|s| s.progress).unwrap_or(0.0));
    }
    let Some(record) = job.stage_mut(stage) else {
      return Ok(0.0);
    };
    if !record.status.is_terminal() {
      record.status = StageStatus::Failed;
    }
    let progress = record.progress;
    job.touch(Utc::now());
    Ok(progress)
  }

  /// Reserves the job for a single pipeline runner.
  ///
  /// Fails with `RunnerActive` on a second claim and with `AlreadyFinalized`
  /// once the job is terminal.
  #[instrument(name = "JobRegistry::claim", skip(self, id), fields(job_id = %id), err(Display))]
  pub fn claim(&self, id: JobId) -> JobResult<()> {
    let mut jobs = self.jobs.write();
    let job = jobs.get_mut(&id).ok_or(JobError::NotFound { id })?;
    if job.status.is_terminal() {
      return Err(JobError::AlreadyFinalized { id, status: job.status });
    }
    if job.runner_claimed {
      return Err(JobError::RunnerActive { id });
    }
    job.runner_claimed = true;
    Ok(())
  }

  /// Moves a `Processing` job into its terminal state.
  ///
  /// Returns `Ok(false)` without touching the record if the job is already
  /// terminal, so duplicate completion signals are safe.
  #[instrument(name = "JobRegistry::finalize", skip(self, id, outcome), fields(job_id = %id), err(Display))]
  pub fn finalize(&self, id: JobId, outcome: Outcome) -> JobResult<bool> {
    {
      let mut jobs = self.jobs.write();
      let job = jobs.get_mut(&id).ok_or(JobError::NotFound { id })?;
      if job.status.is_terminal() {
        event!(Level::DEBUG, status = %job.status, "Job already finalized; ignoring.");
        return Ok(false);
      }
      let now = Utc::now();
      job.touch(now);
      match outcome {
        Outcome::Completed { output } => {
          job.status = JobStatus::Completed;
          job.completed_at = Some(job.last_updated_at);
          job.output = output;
        }
        Outcome::Failed { message } => {
          job.status = JobStatus::Failed;
          job.failed_at = Some(job.last_updated_at);
          job.error_message = Some(message);
        }
      }
      event!(Level::INFO, status = %job.status, "Job finalized.");
    }
    self.finalized.notify_waiters();
    Ok(true)
  }

  /// Summaries of every job, oldest first.
  pub fn list(&self) -> Vec<JobSummary> {
    let mut summaries: Vec<JobSummary> = self.jobs.read().values().map(Job::summary).collect();
    summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    summaries
  }

  pub fn len(&self) -> usize {
    self.jobs.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.jobs.read().is_empty()
  }

  /// Resolves once the job reaches `Completed` or `Failed`.
  pub async fn wait_for_terminal(&self, id: JobId) -> JobResult<Job> {
    loop {
      let notified = self.finalized.notified();
      tokio::pin!(notified);
      // Register before checking so a finalize in between is not missed.
      notified.as_mut().enable();

      let job = self.get(id).ok_or(JobError::NotFound { id })?;
      if job.status.is_terminal() {
        return Ok(job);
      }
      notified.await;
    }
  }
}
