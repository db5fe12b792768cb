// stereoflow/server/src/pipelines/mod.rs

//! Builds the conversion pipeline used by the server.

use crate::config::AppConfig;
use crate::services::simulated_stage::SimulatedStage;
use stereoflow::{Pipeline, StageName};

pub mod profiles;

/// Wires a simulated executor into every stage, paced by the configured profile.
pub fn build_pipeline(config: &AppConfig) -> Pipeline {
  tracing::info!(profile = ?config.pipeline_profile, "Building conversion pipeline...");

  let mut pipeline = Pipeline::new();
  for stage in StageName::ALL {
    let timing = config.pipeline_profile.timing(stage);
    pipeline.on(stage, SimulatedStage::new(config.output_dir.clone(), timing));
  }
  pipeline
}
