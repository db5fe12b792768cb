// stereoflow/src/executor/mod.rs

//! The contract between the pipeline runner and the collaborators that do
//! the actual media work for each stage.
//!
//! An executor receives a `StageInput` describing what to work on and a
//! `ProgressReporter` it may call any number of times. It must eventually
//! return a `StageOutput` or an `ExecutorError`. Pacing, intermediate file
//! layout, and per-item tolerance all belong to the executor.

pub mod items;
pub mod progress;

pub use items::for_each_item;
pub use progress::ProgressReporter;

use crate::artifact::ArtifactRef;
use crate::core::job::JobId;
use crate::core::stage::StageName;
use crate::error::ExecutorError;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

/// What a stage executor is asked to process.
#[derive(Debug, Clone, PartialEq)]
pub struct StageInput {
  pub job_id: JobId,
  pub stage: StageName,
  /// Artifact produced by the closest preceding stage that produced one,
  /// or the uploaded file for the first stage.
  pub input: ArtifactRef,
  /// The original upload.
  pub source: ArtifactRef,
}

/// What a stage executor hands back on success.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOutput {
  pub artifact: Option<ArtifactRef>,
}

impl StageOutput {
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn with_artifact(artifact: impl Into<ArtifactRef>) -> Self {
    Self {
      artifact: Some(artifact.into()),
    }
  }
}

#[async_trait]
pub trait StageExecutor: Send + Sync + 'static {
  async fn execute(&self, input: StageInput, progress: ProgressReporter) -> Result<StageOutput, ExecutorError>;
}

/// Boxed async function form of a stage executor.
pub type ExecutorFn = Box<
  dyn Fn(StageInput, ProgressReporter) -> Pin<Box<dyn Future<Output = Result<StageOutput, ExecutorError>> + Send>>
    + Send
    + Sync,
>;

/// Adapts an async closure into a `StageExecutor`.
///
/// The closure may fail with any error convertible into `ExecutorError`,
/// including `anyhow::Error`.
pub struct FnExecutor {
  func: ExecutorFn,
}

impl FnExecutor {
  pub fn new<F, Fut, UserErr>(func: F) -> Self
  where
    F: Fn(StageInput, ProgressReporter) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<StageOutput, UserErr>> + Send + 'static,
    UserErr: Into<ExecutorError> + Send + 'static,
  {
    let func: ExecutorFn = Box::new(move |input, progress| {
      let user_fut = func(input, progress);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    Self { func }
  }
}

#[async_trait]
impl StageExecutor for FnExecutor {
  async fn execute(&self, input: StageInput, progress: ProgressReporter) -> Result<StageOutput, ExecutorError> {
    (self.func)(input, progress).await
  }
}
