// stereoflow/server/src/services/simulated_stage.rs

//! Stand-in stage executor: paces through the stage's frames and writes a
//! copy of its input as the stage output. No media is transformed.

use crate::pipelines::profiles::StageTiming;
use anyhow::Context;
use async_trait::async_trait;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use stereoflow::{for_each_item, ExecutorError, ProgressReporter, StageExecutor, StageInput, StageName, StageOutput};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct SimulatedStage {
  output_dir: PathBuf,
  timing: StageTiming,
}

impl SimulatedStage {
  pub fn new(output_dir: impl Into<PathBuf>, timing: StageTiming) -> Self {
    Self {
      output_dir: output_dir.into(),
      timing,
    }
  }

  fn target_path(&self, input: &StageInput, source: &Path) -> PathBuf {
    let ext = source.extension().and_then(|e| e.to_str()).unwrap_or("mp4");
    self
      .output_dir
      .join(input.job_id.to_string())
      .join(format!("{}.{}", input.stage.slug(), ext))
  }
}

#[async_trait]
impl StageExecutor for SimulatedStage {
  #[instrument(name = "SimulatedStage::execute", skip_all, fields(job_id = %input.job_id, stage = %input.stage))]
  async fn execute(&self, input: StageInput, progress: ProgressReporter) -> Result<StageOutput, ExecutorError> {
    let source = PathBuf::from(input.input.as_str());
    let size = tokio::fs::metadata(&source)
      .await
      .with_context(|| format!("Cannot read stage input {}", source.display()))?
      .len();

    // An empty upload has no frames to extract.
    let frames = if input.stage == StageName::FrameExtraction && size == 0 {
      0
    } else {
      self.timing.frames
    };
    let interval = self.timing.frame_interval;
    let processed = for_each_item(&progress, 0..frames, |_frame| async move {
      tokio::time::sleep(interval).await;
      Ok::<_, Infallible>(())
    })
    .await?;

    let target = self.target_path(&input, &source);
    if let Some(parent) = target.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("Cannot create stage directory {}", parent.display()))?;
    }
    tokio::fs::copy(&source, &target)
      .await
      .with_context(|| format!("Cannot write stage output {}", target.display()))?;

    info!(frames = processed.len(), output = %target.display(), "Simulated stage finished.");
    Ok(StageOutput::with_artifact(target.to_string_lossy().into_owned()))
  }
}
