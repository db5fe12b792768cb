// stereoflow/src/core/job.rs

//! The job record tracked by the registry, its identifier, and the summary
//! projection used for listings.

use crate::artifact::ArtifactRef;
use crate::core::stage::{Stage, StageName, StageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
  pub fn new() -> Self {
    JobId(Uuid::new_v4())
  }

  pub fn as_uuid(&self) -> &Uuid {
    &self.0
  }
}

impl Default for JobId {
  fn default() -> Self {
    Self::new()
  }
}

impl From<Uuid> for JobId {
  fn from(uuid: Uuid) -> Self {
    JobId(uuid)
  }
}

impl fmt::Display for JobId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

impl FromStr for JobId {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Uuid::parse_str(s).map(JobId)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
  Processing,
  Completed,
  Failed,
}

impl JobStatus {
  pub fn is_terminal(self) -> bool {
    !matches!(self, JobStatus::Processing)
  }
}

impl fmt::Display for JobStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      JobStatus::Processing => "processing",
      JobStatus::Completed => "completed",
      JobStatus::Failed => "failed",
    })
  }
}

/// Terminal outcome handed to `JobRegistry::finalize`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  Completed { output: Option<ArtifactRef> },
  Failed { message: String },
}

/// One end-to-end conversion request.
///
/// `stages` always holds exactly one entry per `StageName`, in pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
  pub id: JobId,
  pub input: ArtifactRef,
  pub status: JobStatus,
  pub stages: Vec<Stage>,
  pub created_at: DateTime<Utc>,
  pub last_updated_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub completed_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub failed_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error_message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub output: Option<ArtifactRef>,
  /// Set once a runner has claimed the job; never cleared.
  #[serde(skip)]
  pub(crate) runner_claimed: bool,
}

impl Job {
  pub(crate) fn new(id: JobId, input: ArtifactRef, now: DateTime<Utc>) -> Self {
    Self {
      id,
      input,
      status: JobStatus::Processing,
      stages: StageName::ALL.iter().copied().map(Stage::pending).collect(),
      created_at: now,
      last_updated_at: now,
      completed_at: None,
      failed_at: None,
      error_message: None,
      output: None,
      runner_claimed: false,
    }
  }

  pub fn stage(&self, name: StageName) -> Option<&Stage> {
    self.stages.iter().find(|s| s.name == name)
  }

  pub(crate) fn stage_mut(&mut self, name: StageName) -> Option<&mut Stage> {
    self.stages.iter_mut().find(|s| s.name == name)
  }

  /// Uniform average of all stage progress values, in `[0, 100]`.
  pub fn overall_progress(&self) -> f32 {
    if self.stages.is_empty() {
      return 0.0;
    }
    self.stages.iter().map(|s| s.progress).sum::<f32>() / self.stages.len() as f32
  }

  /// The stage currently running, or the one that failed the job.
  pub fn current_stage(&self) -> Option<StageName> {
    self
      .stages
      .iter()
      .find(|s| s.status == StageStatus::Processing)
      .or_else(|| self.stages.iter().find(|s| s.status == StageStatus::Failed))
      .map(|s| s.name)
  }

  pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
    if now > self.last_updated_at {
      self.last_updated_at = now;
    }
  }

  pub fn summary(&self) -> JobSummary {
    JobSummary {
      id: self.id,
      status: self.status,
      created_at: self.created_at,
      last_updated_at: self.last_updated_at,
      overall_progress: self.overall_progress(),
      current_stage: self.current_stage(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
  pub id: JobId,
  pub status: JobStatus,
  pub created_at: DateTime<Utc>,
  pub last_updated_at: DateTime<Utc>,
  pub overall_progress: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub current_stage: Option<StageName>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn job() -> Job {
    Job::new(JobId::new(), ArtifactRef::new("uploads/in.mp4"), Utc::now())
  }

  #[test]
  fn new_job_has_every_stage_pending() {
    let job = job();
    assert_eq!(job.status, JobStatus::Processing);
    assert_eq!(job.stages.len(), StageName::COUNT);
    for (stage, name) in job.stages.iter().zip(StageName::ALL) {
      assert_eq!(stage.name, name);
      assert_eq!(stage.status, StageStatus::Pending);
      assert_eq!(stage.progress, 0.0);
    }
    assert_eq!(job.overall_progress(), 0.0);
    assert_eq!(job.current_stage(), None);
  }

  #[test]
  fn overall_progress_weights_stages_uniformly() {
    let mut job = job();
    job.stages[0].progress = 100.0;
    job.stages[1].progress = 50.0;
    assert!((job.overall_progress() - 25.0).abs() < f32::EPSILON);
  }

  #[test]
  fn touch_never_moves_backwards() {
    let mut job = job();
    let before = job.last_updated_at;
    job.touch(before - Duration::seconds(5));
    assert_eq!(job.last_updated_at, before);
    job.touch(before + Duration::seconds(5));
    assert!(job.last_updated_at > before);
  }

  #[test]
  fn job_id_round_trips_through_display() {
    let id = JobId::new();
    let parsed: JobId = id.to_string().parse().unwrap();
    assert_eq!(parsed, id);
    assert!("not-a-uuid".parse::<JobId>().is_err());
  }
}
