// stereoflow/src/pipeline/definition.rs

//! Contains the `Pipeline` struct: the stage-to-executor wiring the runner
//! drives for every job.

use crate::core::stage::StageName;
use crate::error::{ExecutorError, JobError, JobResult};
use crate::executor::{FnExecutor, ProgressReporter, StageExecutor, StageInput, StageOutput};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{event, Level};

/// Executors for the fixed stage sequence.
///
/// The stage order is not configurable; only which executor runs each stage
/// is. A pipeline handed to the orchestrator must have an executor for every
/// stage (see `validate`).
#[derive(Clone, Default)]
pub struct Pipeline {
  executors: HashMap<StageName, Arc<dyn StageExecutor>>,
}

impl Pipeline {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers the executor for `stage`, replacing any previous one.
  pub fn on(&mut self, stage: StageName, executor: impl StageExecutor) -> &mut Self {
    self.on_shared(stage, Arc::new(executor))
  }

  pub fn on_shared(&mut self, stage: StageName, executor: Arc<dyn StageExecutor>) -> &mut Self {
    if self.executors.insert(stage, executor).is_some() {
      event!(Level::DEBUG, %stage, "Replaced stage executor.");
    }
    self
  }

  /// Registers an async closure as the executor for `stage`.
  pub fn on_fn<F, Fut, UserErr>(&mut self, stage: StageName, func: F) -> &mut Self
  where
    F: Fn(StageInput, ProgressReporter) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<StageOutput, UserErr>> + Send + 'static,
    UserErr: Into<ExecutorError> + Send + 'static,
  {
    self.on(stage, FnExecutor::new(func))
  }

  pub fn executor(&self, stage: StageName) -> Option<Arc<dyn StageExecutor>> {
    self.executors.get(&stage).cloned()
  }

  /// Stages without an executor, in pipeline order.
  pub fn missing_stages(&self) -> Vec<StageName> {
    StageName::ALL
      .into_iter()
      .filter(|stage| !self.executors.contains_key(stage))
      .collect()
  }

  pub fn validate(&self) -> JobResult<()> {
    match self.missing_stages().first() {
      Some(&stage) => Err(JobError::ExecutorMissing { stage }),
      None => Ok(()),
    }
  }
}

impl fmt::Debug for Pipeline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut configured: Vec<StageName> = self.executors.keys().copied().collect();
    configured.sort();
    f.debug_struct("Pipeline").field("configured_stages", &configured).finish()
  }
}
