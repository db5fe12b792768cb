// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use stereoflow::{ExecutorError, Pipeline, ProgressReporter, StageExecutor, StageInput, StageName, StageOutput};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::Level;

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Executors ---

/// Reports the given progress values in order, then succeeds (or fails with
/// `fail_with`). Produces `<input>+<stage>` as its artifact.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
  pub progress: Vec<f32>,
  pub fail_with: Option<String>,
  pub delay: Option<Duration>,
}

impl ScriptedExecutor {
  pub fn instant() -> Self {
    Self::default()
  }

  pub fn reporting(progress: &[f32]) -> Self {
    Self {
      progress: progress.to_vec(),
      ..Self::default()
    }
  }

  pub fn failing(message: &str) -> Self {
    Self {
      fail_with: Some(message.to_string()),
      ..Self::default()
    }
  }

  pub fn delayed(delay: Duration) -> Self {
    Self {
      delay: Some(delay),
      ..Self::default()
    }
  }
}

#[async_trait]
impl StageExecutor for ScriptedExecutor {
  async fn execute(&self, input: StageInput, progress: ProgressReporter) -> Result<StageOutput, ExecutorError> {
    for value in &self.progress {
      progress.report(*value);
      tokio::task::yield_now().await;
    }
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    if let Some(message) = &self.fail_with {
      return Err(ExecutorError::failed(message.clone()));
    }
    Ok(StageOutput::with_artifact(format!("{}+{}", input.input, input.stage.slug())))
  }
}

/// Blocks inside the stage until released, so tests can observe a job mid-stage.
#[derive(Clone, Default)]
pub struct GatedExecutor {
  pub entered: Arc<Notify>,
  pub release: Arc<Notify>,
  pub progress_before: Vec<f32>,
}

impl GatedExecutor {
  pub fn new(progress_before: &[f32]) -> Self {
    Self {
      entered: Arc::new(Notify::new()),
      release: Arc::new(Notify::new()),
      progress_before: progress_before.to_vec(),
    }
  }
}

#[async_trait]
impl StageExecutor for GatedExecutor {
  async fn execute(&self, input: StageInput, progress: ProgressReporter) -> Result<StageOutput, ExecutorError> {
    for value in &self.progress_before {
      progress.report(*value);
    }
    self.entered.notify_one();
    self.release.notified().await;
    Ok(StageOutput::with_artifact(format!("{}+{}", input.input, input.stage.slug())))
  }
}

/// One executor invocation as seen by `RecordingExecutor`.
#[derive(Debug, Clone, PartialEq)]
pub struct StageEvent {
  pub seq: usize,
  pub job_input: String,
  pub stage: StageName,
  pub started: bool,
}

/// Appends start/finish events to a shared log, sleeping a per-job,
/// per-stage pseudo-random time in between.
#[derive(Clone)]
pub struct RecordingExecutor {
  pub log: Arc<Mutex<Vec<StageEvent>>>,
  pub seq: Arc<AtomicUsize>,
}

impl RecordingExecutor {
  pub fn new() -> Self {
    Self {
      log: Arc::new(Mutex::new(Vec::new())),
      seq: Arc::new(AtomicUsize::new(0)),
    }
  }

  fn record(&self, input: &StageInput, started: bool) {
    let seq = self.seq.fetch_add(1, Ordering::SeqCst);
    self.log.lock().push(StageEvent {
      seq,
      job_input: input.source.to_string(),
      stage: input.stage,
      started,
    });
  }
}

#[async_trait]
impl StageExecutor for RecordingExecutor {
  async fn execute(&self, input: StageInput, progress: ProgressReporter) -> Result<StageOutput, ExecutorError> {
    self.record(&input, true);
    let jitter = pseudo_random_millis(input.source.as_str(), input.stage);
    progress.report(50.0);
    tokio::time::sleep(Duration::from_millis(jitter)).await;
    progress.report(100.0);
    self.record(&input, false);
    Ok(StageOutput::with_artifact(format!("{}+{}", input.input, input.stage.slug())))
  }
}

/// Deterministic 0..=7 ms delay derived from the input and stage.
pub fn pseudo_random_millis(key: &str, stage: StageName) -> u64 {
  let hash = key
    .bytes()
    .fold(stage.index() as u64 + 17, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
  hash % 8
}

// --- Pipeline builders ---

/// A pipeline where every stage uses a clone of `executor`.
pub fn uniform_pipeline<E: StageExecutor + Clone>(executor: E) -> Pipeline {
  let mut pipeline = Pipeline::new();
  for stage in StageName::ALL {
    pipeline.on(stage, executor.clone());
  }
  pipeline
}

/// Instant executors everywhere except `stage`, which uses `executor`.
pub fn pipeline_with(stage: StageName, executor: impl StageExecutor) -> Pipeline {
  let mut pipeline = uniform_pipeline(ScriptedExecutor::instant());
  pipeline.on(stage, executor);
  pipeline
}
