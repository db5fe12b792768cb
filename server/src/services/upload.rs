// stereoflow/server/src/services/upload.rs

//! Upload intake: file type validation and storage of the raw upload.

use crate::errors::{AppError, Result as AppResult};
use std::path::Path;
use stereoflow::ArtifactRef;
use tracing::{info, instrument};
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["mp4", "mov", "avi"];

/// Reduces a client-supplied filename to a safe basename with an allowed
/// video extension.
pub fn sanitize_filename(raw: &str) -> AppResult<String> {
  let base = Path::new(raw.trim())
    .file_name()
    .and_then(|n| n.to_str())
    .ok_or_else(|| AppError::Validation("A filename is required".to_string()))?;

  let cleaned: String = base
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
    .collect();

  let extension = Path::new(&cleaned)
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| e.to_ascii_lowercase())
    .unwrap_or_default();
  if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
    return Err(AppError::Validation(format!(
      "Unsupported file type '{}'; upload an MP4, MOV or AVI video",
      base
    )));
  }
  Ok(cleaned)
}

/// Writes the upload under a unique name and returns its artifact handle.
#[instrument(skip(upload_dir, body), fields(bytes = body.len()))]
pub async fn store_upload(upload_dir: &Path, filename: &str, body: &[u8]) -> AppResult<ArtifactRef> {
  let safe_name = sanitize_filename(filename)?;
  tokio::fs::create_dir_all(upload_dir).await?;
  let path = upload_dir.join(format!("{}-{}", Uuid::new_v4(), safe_name));
  tokio::fs::write(&path, body).await?;
  info!(path = %path.display(), "Upload stored.");
  Ok(ArtifactRef::new(path.to_string_lossy().into_owned()))
}
