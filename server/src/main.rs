// stereoflow/server/src/main.rs

mod config;
mod errors;
mod pipelines;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::services::artifact_store::FsArtifactStore;
use crate::services::shutdown;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use stereoflow::Orchestrator;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting VR180 conversion server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  for dir in [&app_config.upload_dir, &app_config.output_dir] {
    tokio::fs::create_dir_all(dir).await?;
  }

  let orchestrator = Orchestrator::new(pipelines::build_pipeline(&app_config))
    .map_err(|e| std::io::Error::other(e.to_string()))?
    .with_artifact_store(Arc::new(FsArtifactStore));
  tracing::info!("Conversion pipeline ready.");

  let app_state = AppState {
    orchestrator: orchestrator.clone(),
    config: app_config.clone(),
  };

  let server_address = app_config.bind_address();
  tracing::info!(cors = app_config.enable_cors, "Attempting to bind server to {}...", server_address);

  let cors_config = app_config.clone();
  let served = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(web::cors_middleware(&cors_config))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await;

  tracing::info!("HTTP server stopped.");
  shutdown::drain_running_jobs(&orchestrator, app_config.shutdown_grace).await;
  served
}
