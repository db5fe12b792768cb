// stereoflow/src/artifact.rs

//! Opaque artifact handles and the store contract used to resolve them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token naming an uploaded input or a produced output in an external store.
/// The orchestrator never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
  pub fn new(token: impl Into<String>) -> Self {
    ArtifactRef(token.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ArtifactRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for ArtifactRef {
  fn from(token: String) -> Self {
    ArtifactRef(token)
  }
}

impl From<&str> for ArtifactRef {
  fn from(token: &str) -> Self {
    ArtifactRef(token.to_string())
  }
}

/// Resolves artifact handles against wherever the bytes actually live.
#[async_trait]
pub trait ArtifactStore: Send + Sync + 'static {
  /// Whether the artifact still exists.
  async fn contains(&self, artifact: &ArtifactRef) -> bool;
}
