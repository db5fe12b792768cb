// stereoflow/src/core/stage.rs

//! Defines the stages of the conversion pipeline and their per-job progress record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One named step of the conversion pipeline.
///
/// The declaration order is the execution order; `StageName::ALL` is the
/// canonical sequence every job is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
  FrameExtraction,
  DepthEstimation,
  StereoSynthesis,
  Outpainting,
  FoveatedBlur,
  Upscaling,
}

impl StageName {
  pub const ALL: [StageName; 6] = [
    StageName::FrameExtraction,
    StageName::DepthEstimation,
    StageName::StereoSynthesis,
    StageName::Outpainting,
    StageName::FoveatedBlur,
    StageName::Upscaling,
  ];

  pub const COUNT: usize = Self::ALL.len();

  /// Position of this stage in the pipeline.
  pub fn index(self) -> usize {
    self as usize
  }

  /// Short identifier, also used for on-disk names by executors.
  pub fn slug(self) -> &'static str {
    match self {
      StageName::FrameExtraction => "frame_extraction",
      StageName::DepthEstimation => "depth_estimation",
      StageName::StereoSynthesis => "stereo_synthesis",
      StageName::Outpainting => "outpainting",
      StageName::FoveatedBlur => "foveated_blur",
      StageName::Upscaling => "upscaling",
    }
  }
}

impl fmt::Display for StageName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      StageName::FrameExtraction => "Frame Extraction",
      StageName::DepthEstimation => "Depth Estimation",
      StageName::StereoSynthesis => "Stereo Synthesis",
      StageName::Outpainting => "Outpainting",
      StageName::FoveatedBlur => "Foveated Blur",
      StageName::Upscaling => "Upscaling",
    };
    f.write_str(label)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
  Pending,
  Processing,
  Completed,
  Failed,
}

impl StageStatus {
  pub fn is_terminal(self) -> bool {
    matches!(self, StageStatus::Completed | StageStatus::Failed)
  }
}

/// Progress record of one stage within one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
  pub name: StageName,
  /// Percentage in `[0, 100]`.
  pub progress: f32,
  pub status: StageStatus,
}

impl Stage {
  pub fn pending(name: StageName) -> Self {
    Self {
      name,
      progress: 0.0,
      status: StageStatus::Pending,
    }
  }
}
