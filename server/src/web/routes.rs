// stereoflow/server/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{job_handlers, upload_handlers};

// Called from `main.rs` to mount every route on the Actix app.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.route("/", web::get().to(job_handlers::root_handler)).service(
    web::scope("/api")
      .route("/health", web::get().to(job_handlers::health_check_handler))
      .route("/upload", web::post().to(upload_handlers::upload_handler))
      .route("/jobs", web::get().to(job_handlers::list_jobs_handler))
      .route("/status/{job_id}", web::get().to(job_handlers::job_status_handler))
      .route("/result/{job_id}", web::get().to(job_handlers::job_result_handler))
      .route("/download/{job_id}", web::get().to(job_handlers::job_download_handler)),
  );
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::pipelines::build_pipeline;
  use crate::services::artifact_store::FsArtifactStore;
  use crate::state::AppState;
  use crate::web::cors_middleware;
  use actix_web::{http::header, http::StatusCode, test, App};
  use serde_json::Value;
  use std::sync::Arc;
  use stereoflow::{JobId, Orchestrator};

  const BOUNDARY: &str = "stereoflow-test-boundary";

  fn test_state(config: AppConfig) -> AppState {
    let orchestrator = Orchestrator::new(build_pipeline(&config))
      .unwrap()
      .with_artifact_store(Arc::new(FsArtifactStore));
    AppState {
      orchestrator,
      config: Arc::new(config),
    }
  }

  /// Form body as a browser or `requests` would send it: a `filename`
  /// field followed by the `video` file part.
  fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
      "--{b}\r\nContent-Disposition: form-data; name=\"filename\"\r\n\r\n{f}\r\n\
       --{b}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"{f}\"\r\n\
       Content-Type: video/mp4\r\n\r\n",
      b = BOUNDARY,
      f = filename
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
  }

  fn upload_request(filename: &str, content: &[u8]) -> test::TestRequest {
    test::TestRequest::post()
      .uri("/api/upload")
      .insert_header((
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
      ))
      .set_payload(multipart_body(filename, content))
  }

  #[actix_web::test]
  async fn health_root_and_unknown_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(test_state(AppConfig::for_tests(dir.path()))))
        .configure(configure_app_routes),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let root: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(root["status"], "ok");

    let unknown = format!("/api/status/{}", JobId::new());
    let resp = test::call_service(&app, test::TestRequest::get().uri(&unknown).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/result/not-a-uuid").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[actix_web::test]
  async fn rejects_bad_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(test_state(AppConfig::for_tests(dir.path()))))
        .configure(configure_app_routes),
    )
    .await;

    let req = upload_request("notes.txt", b"hello").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = upload_request("big.mp4", &[0u8; 2048]).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::PAYLOAD_TOO_LARGE);

    // Only a filename, no video part.
    let body = format!(
      "--{b}\r\nContent-Disposition: form-data; name=\"filename\"\r\n\r\nclip.mp4\r\n--{b}--\r\n",
      b = BOUNDARY
    );
    let req = test::TestRequest::post()
      .uri("/api/upload")
      .insert_header((
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
      ))
      .set_payload(body)
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
  }

  #[actix_web::test]
  async fn multipart_upload_runs_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(AppConfig::for_tests(dir.path()));
    let orchestrator = state.orchestrator.clone();
    let app = test::init_service(
      App::new()
        .app_data(web::Data::new(state))
        .configure(configure_app_routes),
    )
    .await;

    let body: Value = test::call_and_read_body_json(&app, upload_request("clip.mp4", b"fake video bytes").to_request()).await;
    assert_eq!(body["status"], "processing");
    let job_id: JobId = body["jobId"].as_str().unwrap().parse().unwrap();

    let early = format!("/api/result/{}", job_id);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&early).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    orchestrator.wait(job_id).await.unwrap();

    let status: Value = test::call_and_read_body_json(
      &app,
      test::TestRequest::get().uri(&format!("/api/status/{}", job_id)).to_request(),
    )
    .await;
    assert_eq!(status["status"], "completed");
    assert_eq!(status["overallProgress"], 100.0);
    assert_eq!(status["stages"].as_array().unwrap().len(), 6);
    assert!(status["input"].as_str().unwrap().ends_with("-clip.mp4"));

    let resp = test::call_service(
      &app,
      test::TestRequest::get().uri(&format!("/api/download/{}", job_id)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "fake video bytes");

    let jobs: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/jobs").to_request()).await;
    assert_eq!(jobs["count"], 1);
  }

  #[actix_web::test]
  async fn cors_preflight_follows_config() {
    let dir = tempfile::tempdir().unwrap();
    let preflight = || {
      test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/upload")
        .insert_header((header::ORIGIN, "http://localhost:8501"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .to_request()
    };

    let config = AppConfig::for_tests(dir.path());
    let app = test::init_service(
      App::new()
        .wrap(cors_middleware(&config))
        .app_data(web::Data::new(test_state(config)))
        .configure(configure_app_routes),
    )
    .await;
    let resp = test::call_service(&app, preflight()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let mut config = AppConfig::for_tests(dir.path());
    config.enable_cors = false;
    let app = test::init_service(
      App::new()
        .wrap(cors_middleware(&config))
        .app_data(web::Data::new(test_state(config)))
        .configure(configure_app_routes),
    )
    .await;
    let resp = test::call_service(&app, preflight()).await;
    assert_ne!(resp.status(), StatusCode::OK);
    assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
  }
}
