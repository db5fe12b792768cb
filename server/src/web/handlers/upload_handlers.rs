// stereoflow/server/src/web/handlers/upload_handlers.rs

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::errors::{AppError, Result as AppResult};
use crate::services::upload::store_upload;
use crate::state::AppState;

/// Longest value accepted for the `filename` form field.
const FILENAME_FIELD_LIMIT: usize = 1024;

fn malformed(err: MultipartError) -> AppError {
  AppError::Validation(format!("Malformed multipart body: {}", err))
}

/// Buffers one form field, failing once it grows past `limit` bytes.
async fn read_field(field: &mut Field, limit: usize) -> AppResult<Vec<u8>> {
  let mut buf = Vec::new();
  while let Some(chunk) = field.try_next().await.map_err(malformed)? {
    if buf.len() + chunk.len() > limit {
      return Err(AppError::PayloadTooLarge(format!("Upload exceeds the {} byte limit", limit)));
    }
    buf.extend_from_slice(&chunk);
  }
  Ok(buf)
}

/// Takes a `multipart/form-data` body with a `video` file part and an
/// optional `filename` field, stores the video and starts the pipeline.
#[instrument(name = "handler::upload", skip_all)]
pub async fn upload_handler(app_state: web::Data<AppState>, mut payload: Multipart) -> AppResult<HttpResponse> {
  let limit = app_state.config.max_upload_bytes;
  let mut video: Option<Vec<u8>> = None;
  let mut part_filename: Option<String> = None;
  let mut form_filename: Option<String> = None;

  while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
    let name = field.name().unwrap_or_default().to_string();
    match name.as_str() {
      "video" => {
        part_filename = field
          .content_disposition()
          .and_then(|cd| cd.get_filename())
          .map(str::to_string);
        video = Some(read_field(&mut field, limit).await?);
      }
      "filename" => {
        let raw = read_field(&mut field, FILENAME_FIELD_LIMIT).await?;
        form_filename = Some(String::from_utf8_lossy(&raw).trim().to_string());
      }
      other => {
        debug!(field = other, "Skipping unexpected form field.");
        while field.try_next().await.map_err(malformed)?.is_some() {}
      }
    }
  }

  let body = video.ok_or_else(|| AppError::Validation("No video file provided".to_string()))?;
  let filename = form_filename
    .filter(|name| !name.is_empty())
    .or(part_filename)
    .ok_or_else(|| AppError::Validation("A filename is required".to_string()))?;

  let input = store_upload(&app_state.config.upload_dir, &filename, &body).await?;
  let job_id = app_state.orchestrator.submit(input)?;
  info!(%job_id, %filename, bytes = body.len(), "Upload accepted; processing started.");

  Ok(HttpResponse::Ok().json(json!({
      "message": "Upload successful. Processing started.",
      "jobId": job_id,
      "status": "processing"
  })))
}
