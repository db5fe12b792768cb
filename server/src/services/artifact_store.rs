// stereoflow/server/src/services/artifact_store.rs

use async_trait::async_trait;
use stereoflow::{ArtifactRef, ArtifactStore};

/// Artifacts are local file paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactStore;

#[async_trait]
impl ArtifactStore for FsArtifactStore {
  async fn contains(&self, artifact: &ArtifactRef) -> bool {
    tokio::fs::try_exists(artifact.as_str()).await.unwrap_or(false)
  }
}
