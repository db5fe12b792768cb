// stereoflow/src/pipeline/execution.rs

//! Contains `PipelineRunner`, which drives one job through every stage and
//! records each step in the registry.

use crate::artifact::ArtifactRef;
use crate::core::job::{JobId, Outcome};
use crate::core::stage::{StageName, StageStatus};
use crate::error::{ExecutorError, JobError, JobResult, PipelineError};
use crate::executor::{ProgressReporter, StageInput, StageOutput};
use crate::pipeline::definition::Pipeline;
use crate::registry::JobRegistry;

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{event, info_span, instrument, Instrument, Level};

/// Runs the stage sequence for exactly one job.
///
/// The runner is the only writer of its job's stages. Constructing one claims
/// the job in the registry, so a job gets at most one runner, and `run`
/// consumes the runner.
pub struct PipelineRunner {
  job_id: JobId,
  source: ArtifactRef,
  pipeline: Arc<Pipeline>,
  registry: Arc<JobRegistry>,
}

impl PipelineRunner {
  /// Claims `job_id` for this runner.
  ///
  /// Fails if the job is unknown, already finished, or already claimed.
  pub fn new(
    job_id: JobId,
    source: ArtifactRef,
    pipeline: Arc<Pipeline>,
    registry: Arc<JobRegistry>,
  ) -> JobResult<Self> {
    registry.claim(job_id)?;
    Ok(Self {
      job_id,
      source,
      pipeline,
      registry,
    })
  }

  /// Executes every stage in order and finalizes the job.
  ///
  /// Stops at the first failing stage. The job record is finalized before
  /// this returns either way; the returned error is only for the caller's
  /// logs.
  #[instrument(name = "PipelineRunner::run", skip_all, fields(job_id = %self.job_id))]
  pub async fn run(self) -> Result<Option<ArtifactRef>, PipelineError> {
    event!(Level::DEBUG, "Pipeline execution starting.");
    let result = self.run_stages().await;

    let outcome = match &result {
      Ok(output) => Outcome::Completed { output: output.clone() },
      Err(e) => Outcome::Failed {
        message: e.source.to_string(),
      },
    };
    match self.registry.finalize(self.job_id, outcome) {
      Ok(true) => {}
      Ok(false) => event!(Level::WARN, "Job was already finalized by someone else."),
      Err(e) => event!(Level::ERROR, error = %e, "Could not finalize job."),
    }

    match &result {
      Ok(_) => event!(Level::INFO, "Pipeline completed."),
      Err(e) => event!(Level::ERROR, stage = %e.stage, error = %e.source, "Pipeline failed."),
    }
    result
  }

  async fn run_stages(&self) -> Result<Option<ArtifactRef>, PipelineError> {
    let mut current_input = self.source.clone();
    let mut last_output: Option<ArtifactRef> = None;

    for stage in StageName::ALL {
      let span = info_span!("pipeline_stage_execution", stage = %stage, stage_index = stage.index());
      let output = self.run_stage(stage, current_input.clone()).instrument(span).await?;

      if let Some(artifact) = output.artifact {
        current_input = artifact.clone();
        last_output = Some(artifact);
      }
    }
    Ok(last_output)
  }

  async fn run_stage(&self, stage: StageName, input: ArtifactRef) -> Result<StageOutput, PipelineError> {
    self.write_stage(stage, 0.0, StageStatus::Processing);
    event!(Level::DEBUG, "Stage started.");

    let result = match self.pipeline.executor(stage) {
      Some(executor) => {
        let stage_input = StageInput {
          job_id: self.job_id,
          stage,
          input,
          source: self.source.clone(),
        };
        let progress = ProgressReporter::new(self.registry.clone(), self.job_id, stage);
        match AssertUnwindSafe(executor.execute(stage_input, progress))
          .catch_unwind()
          .await
        {
          Ok(result) => result,
          Err(_) => Err(ExecutorError::Panicked { stage }),
        }
      }
      None => Err(ExecutorError::Failed(JobError::ExecutorMissing { stage }.to_string())),
    };

    match result {
      Ok(output) => {
        self.write_stage(stage, 100.0, StageStatus::Completed);
        event!(Level::DEBUG, artifact = ?output.artifact, "Stage completed.");
        Ok(output)
      }
      Err(source) => {
        let last_progress = match self.registry.fail_stage(self.job_id, stage) {
          Ok(progress) => progress,
          Err(e) => {
            event!(Level::WARN, %stage, error = %e, "Stage failure rejected by registry.");
            0.0
          }
        };
        event!(Level::ERROR, error = %source, last_progress, "Stage failed.");
        Err(PipelineError {
          job_id: self.job_id,
          stage,
          source,
        })
      }
    }
  }

  fn write_stage(&self, stage: StageName, progress: f32, status: StageStatus) {
    if let Err(e) = self.registry.mutate_stage(self.job_id, stage, progress, status) {
      event!(Level::WARN, %stage, error = %e, "Stage update rejected by registry.");
    }
  }
}
