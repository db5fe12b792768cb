// stereoflow/server/src/pipelines/profiles.rs

//! Per-stage pacing for the simulated executors. The two profiles are the
//! same pipeline with different frame counts and frame intervals.

use crate::errors::AppError;
use std::str::FromStr;
use std::time::Duration;
use stereoflow::StageName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineProfile {
  /// Full-length run, seconds per stage.
  #[default]
  Standard,
  /// Short frame counts and intervals for demos and tests.
  Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
  pub frames: u32,
  pub frame_interval: Duration,
}

impl StageTiming {
  const fn new(frames: u32, frame_interval_ms: u64) -> Self {
    Self {
      frames,
      frame_interval: Duration::from_millis(frame_interval_ms),
    }
  }
}

impl PipelineProfile {
  pub fn timing(self, stage: StageName) -> StageTiming {
    match (self, stage) {
      (PipelineProfile::Standard, StageName::FrameExtraction) => StageTiming::new(120, 50),
      (PipelineProfile::Standard, StageName::DepthEstimation) => StageTiming::new(120, 100),
      (PipelineProfile::Standard, StageName::StereoSynthesis) => StageTiming::new(120, 75),
      (PipelineProfile::Standard, StageName::Outpainting) => StageTiming::new(120, 100),
      (PipelineProfile::Standard, StageName::FoveatedBlur) => StageTiming::new(120, 40),
      (PipelineProfile::Standard, StageName::Upscaling) => StageTiming::new(120, 120),
      (PipelineProfile::Preview, StageName::FrameExtraction) => StageTiming::new(12, 5),
      (PipelineProfile::Preview, _) => StageTiming::new(12, 2),
    }
  }
}

impl FromStr for PipelineProfile {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "standard" => Ok(PipelineProfile::Standard),
      "preview" => Ok(PipelineProfile::Preview),
      other => Err(AppError::Config(format!(
        "Unknown PIPELINE_PROFILE '{}' (expected 'standard' or 'preview')",
        other
      ))),
    }
  }
}
