// stereoflow/server/src/web/handlers/job_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::{AppError, Result as AppResult};
use crate::state::AppState;
use stereoflow::{Job, JobId};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JobStatusResponse {
  #[serde(flatten)]
  job: Job,
  overall_progress: f32,
}

/// Landing route; clients hit it to wake the backend before uploading.
pub async fn root_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({
      "message": "VR180 conversion backend is running",
      "status": "ok"
  }))
}

pub async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

fn parse_job_id(raw: &str) -> AppResult<JobId> {
  raw
    .parse::<JobId>()
    .map_err(|_| AppError::NotFound(format!("Job {} not found", raw)))
}

#[instrument(name = "handler::job_status", skip(app_state, path), fields(job_id = %path.as_str()))]
pub async fn job_status_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
  let job_id = parse_job_id(&path.into_inner())?;
  let job = app_state.orchestrator.status(job_id)?;
  let overall_progress = job.overall_progress();
  Ok(HttpResponse::Ok().json(JobStatusResponse { job, overall_progress }))
}

#[instrument(name = "handler::job_result", skip(app_state, path), fields(job_id = %path.as_str()))]
pub async fn job_result_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
  let job_id = parse_job_id(&path.into_inner())?;
  let output = app_state.orchestrator.result(job_id).await?;
  Ok(HttpResponse::Ok().json(json!({
      "jobId": job_id,
      "output": output
  })))
}

#[instrument(name = "handler::job_download", skip(app_state, path), fields(job_id = %path.as_str()))]
pub async fn job_download_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
  let job_id = parse_job_id(&path.into_inner())?;
  let output = app_state.orchestrator.result(job_id).await?;
  let bytes = tokio::fs::read(output.as_str()).await?;
  info!(bytes = bytes.len(), "Serving converted video.");

  Ok(
    HttpResponse::Ok()
      .content_type("video/mp4")
      .insert_header((
        "Content-Disposition",
        format!("attachment; filename=\"vr180-{}.mp4\"", job_id),
      ))
      .body(bytes),
  )
}

#[instrument(name = "handler::list_jobs", skip(app_state))]
pub async fn list_jobs_handler(app_state: web::Data<AppState>) -> AppResult<HttpResponse> {
  let jobs = app_state.orchestrator.list_jobs();
  Ok(HttpResponse::Ok().json(json!({
      "count": jobs.len(),
      "jobs": jobs
  })))
}
