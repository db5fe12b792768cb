// stereoflow/server/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use stereoflow::JobError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Payload Too Large: {0}")]
  PayloadTooLarge(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Storage Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Job Error: {source}")]
  Job {
    #[from]
    source: JobError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(format!("{:#}", err))
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::PayloadTooLarge(m) => HttpResponse::PayloadTooLarge().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Io(_) => HttpResponse::InternalServerError().json(json!({"error": "Storage operation failed"})),
      AppError::Job { source } => match source {
        JobError::NotFound { id } => HttpResponse::NotFound().json(json!({"error": "Job not found", "jobId": id})),
        JobError::NotReady { id, status } => HttpResponse::Conflict().json(json!({
            "error": "Job is not completed",
            "jobId": id,
            "status": status
        })),
        other => HttpResponse::InternalServerError()
          .json(json!({"error": "Job processing error", "detail": other.to_string()})),
      },
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
