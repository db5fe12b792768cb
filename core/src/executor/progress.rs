// stereoflow/src/executor/progress.rs

use crate::core::job::JobId;
use crate::core::stage::{StageName, StageStatus};
use crate::registry::JobRegistry;
use std::fmt;
use std::sync::Arc;
use tracing::{event, Level};

/// Progress callback handed to a stage executor.
///
/// Every call is written straight into the registry. Values are clamped to
/// `[0, 100]`; decreasing values are recorded as-is. Reports arriving after
/// the stage finished are ignored by the registry.
#[derive(Clone)]
pub struct ProgressReporter {
  registry: Arc<JobRegistry>,
  job_id: JobId,
  stage: StageName,
}

impl ProgressReporter {
  pub fn new(registry: Arc<JobRegistry>, job_id: JobId, stage: StageName) -> Self {
    Self {
      registry,
      job_id,
      stage,
    }
  }

  pub fn job_id(&self) -> JobId {
    self.job_id
  }

  pub fn stage(&self) -> StageName {
    self.stage
  }

  pub fn report(&self, percent: f32) {
    if let Err(e) = self
      .registry
      .mutate_stage(self.job_id, self.stage, percent, StageStatus::Processing)
    {
      event!(Level::WARN, job_id = %self.job_id, stage = %self.stage, error = %e, "Progress report rejected.");
    }
  }

  /// Last progress value the registry accepted for this stage.
  pub fn last(&self) -> Option<f32> {
    self.registry.stage_progress(self.job_id, self.stage)
  }

  /// Reports `done / total` as a percentage. A zero `total` reports 100.
  pub fn report_fraction(&self, done: usize, total: usize) {
    if total == 0 {
      self.report(100.0);
    } else {
      self.report(done as f32 * 100.0 / total as f32);
    }
  }
}

impl fmt::Debug for ProgressReporter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ProgressReporter")
      .field("job_id", &self.job_id)
      .field("stage", &self.stage)
      .finish()
  }
}
