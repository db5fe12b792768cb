// stereoflow/server/src/web/mod.rs

use actix_cors::Cors;
use actix_web::middleware::Condition;

use crate::config::AppConfig;

pub mod handlers;
pub mod routes;

pub use routes::configure_app_routes;

/// Permissive CORS for browser frontends on other origins, when enabled.
pub fn cors_middleware(config: &AppConfig) -> Condition<Cors> {
  Condition::new(config.enable_cors, Cors::permissive())
}
