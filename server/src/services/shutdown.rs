// stereoflow/server/src/services/shutdown.rs

use futures_util::future::join_all;
use std::time::Duration;
use stereoflow::{JobId, Orchestrator};
use tracing::{info, instrument, warn};

/// Waits up to `grace` for jobs that are still processing and logs how each
/// one ended. Returns the number of jobs left unfinished.
#[instrument(skip(orchestrator))]
pub async fn drain_running_jobs(orchestrator: &Orchestrator, grace: Duration) -> usize {
  let running: Vec<JobId> = orchestrator
    .list_jobs()
    .into_iter()
    .filter(|job| !job.status.is_terminal())
    .map(|job| job.id)
    .collect();
  if running.is_empty() {
    info!("No jobs in flight at shutdown.");
    return 0;
  }

  info!(count = running.len(), "Waiting for in-flight jobs before shutdown.");
  let waits = running.iter().map(|id| orchestrator.wait(*id));
  match tokio::time::timeout(grace, join_all(waits)).await {
    Ok(finished) => {
      for job in finished.into_iter().flatten() {
        info!(job_id = %job.id, status = %job.status, "Job finished during shutdown.");
      }
      0
    }
    Err(_) => {
      let left = running
        .iter()
        .filter(|id| {
          orchestrator
            .status(**id)
            .map(|job| !job.status.is_terminal())
            .unwrap_or(false)
        })
        .count();
      warn!(left, "Shutdown grace period elapsed with jobs still processing.");
      left
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::pipelines::{build_pipeline, profiles::PipelineProfile};
  use stereoflow::{ArtifactRef, JobStatus};

  async fn submit_one(config: &AppConfig) -> (Orchestrator, JobId) {
    let upload = config.upload_dir.join("clip.mp4");
    tokio::fs::create_dir_all(&config.upload_dir).await.unwrap();
    tokio::fs::write(&upload, b"frames").await.unwrap();

    let orchestrator = Orchestrator::new(build_pipeline(config)).unwrap();
    let id = orchestrator
      .submit(ArtifactRef::new(upload.to_string_lossy().into_owned()))
      .unwrap();
    (orchestrator, id)
  }

  #[tokio::test]
  async fn waits_for_jobs_within_the_grace_period() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::for_tests(dir.path());
    let (orchestrator, id) = submit_one(&config).await;

    assert_eq!(drain_running_jobs(&orchestrator, Duration::from_secs(10)).await, 0);
    assert_eq!(orchestrator.status(id).unwrap().status, JobStatus::Completed);
  }

  #[tokio::test]
  async fn reports_jobs_left_after_the_grace_period() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::for_tests(dir.path());
    config.pipeline_profile = PipelineProfile::Standard;
    let (orchestrator, id) = submit_one(&config).await;

    assert_eq!(drain_running_jobs(&orchestrator, Duration::from_millis(20)).await, 1);
    assert_eq!(orchestrator.status(id).unwrap().status, JobStatus::Processing);
  }

  #[tokio::test]
  async fn nothing_to_wait_for() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::new(build_pipeline(&AppConfig::for_tests(dir.path()))).unwrap();
    assert_eq!(drain_running_jobs(&orchestrator, Duration::from_millis(1)).await, 0);
  }
}
