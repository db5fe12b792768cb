// stereoflow/src/orchestrator.rs

//! Defines `Orchestrator`, the public entry point: it registers jobs, starts
//! their pipeline runners in the background, and answers status and result
//! queries from the registry.

use crate::artifact::{ArtifactRef, ArtifactStore};
use crate::core::job::{Job, JobId, JobStatus, JobSummary};
use crate::error::{JobError, JobResult};
use crate::pipeline::{Pipeline, PipelineRunner};
use crate::registry::JobRegistry;

use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{event, instrument, Instrument, Level};

/// Job manager. Cloning is cheap and every clone shares the same registry.
#[derive(Clone)]
pub struct Orchestrator {
  registry: Arc<JobRegistry>,
  pipeline: Arc<Pipeline>,
  artifacts: Option<Arc<dyn ArtifactStore>>,
  runtime: Handle,
}

impl Orchestrator {
  /// Creates an orchestrator running pipelines on the current tokio runtime.
  ///
  /// Fails if `pipeline` lacks an executor for any stage, or if called
  /// outside a runtime.
  pub fn new(pipeline: Pipeline) -> JobResult<Self> {
    let runtime = Handle::try_current()
      .map_err(|e| JobError::Internal(format!("Orchestrator must be created inside a tokio runtime: {}", e)))?;
    Self::with_runtime(pipeline, runtime)
  }

  /// Same as `new`, but spawns runners on an explicit runtime.
  pub fn with_runtime(pipeline: Pipeline, runtime: Handle) -> JobResult<Self> {
    pipeline.validate()?;
    event!(Level::DEBUG, ?pipeline, "Orchestrator created.");
    Ok(Self {
      registry: Arc::new(JobRegistry::new()),
      pipeline: Arc::new(pipeline),
      artifacts: None,
      runtime,
    })
  }

  /// Checks completed outputs against `store` before handing them out.
  pub fn with_artifact_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
    self.artifacts = Some(store);
    self
  }

  pub fn registry(&self) -> &Arc<JobRegistry> {
    &self.registry
  }

  /// Registers a job for `input` and starts its pipeline in the background.
  ///
  /// Returns as soon as the job is registered; it never waits on any stage.
  #[instrument(name = "Orchestrator::submit", skip_all, fields(input = %input), err(Display))]
  pub fn submit(&self, input: ArtifactRef) -> JobResult<JobId> {
    let id = JobId::new();
    self.registry.create(id, input.clone())?;

    let runner = PipelineRunner::new(id, input, self.pipeline.clone(), self.registry.clone())?;
    let span = tracing::info_span!("job", job_id = %id);
    self.runtime.spawn(
      async move {
        // Failures are already recorded on the job; nothing to propagate.
        let _ = runner.run().await;
      }
      .instrument(span),
    );

    event!(Level::INFO, job_id = %id, "Job submitted.");
    Ok(id)
  }

  pub fn status(&self, id: JobId) -> JobResult<Job> {
    self.registry.get(id).ok_or(JobError::NotFound { id })
  }

  /// Reference to the finished output of a completed job.
  pub async fn result(&self, id: JobId) -> JobResult<ArtifactRef> {
    let job = self.status(id)?;
    if job.status != JobStatus::Completed {
      return Err(JobError::NotReady { id, status: job.status });
    }
    let output = job.output.ok_or_else(|| {
      event!(Level::WARN, job_id = %id, "Completed job has no output artifact.");
      JobError::NotFound { id }
    })?;

    if let Some(store) = &self.artifacts {
      if !store.contains(&output).await {
        event!(Level::WARN, job_id = %id, artifact = %output, "Output artifact is missing from the store.");
        return Err(JobError::NotFound { id });
      }
    }
    Ok(output)
  }

  pub fn list_jobs(&self) -> Vec<JobSummary> {
    self.registry.list()
  }

  /// Waits until the job is `Completed` or `Failed` and returns its final record.
  pub async fn wait(&self, id: JobId) -> JobResult<Job> {
    self.registry.wait_for_terminal(id).await
  }
}
