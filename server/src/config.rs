// stereoflow/server/src/config.rs

use crate::errors::{AppError, Result};
use crate::pipelines::profiles::PipelineProfile;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Upload size limit of the original service.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub upload_dir: PathBuf,
  pub output_dir: PathBuf,
  pub max_upload_bytes: usize,
  pub pipeline_profile: PipelineProfile,
  /// Answer CORS preflights and add CORS headers for any origin.
  pub enable_cors: bool,
  /// How long shutdown waits for jobs that are still processing.
  pub shutdown_grace: Duration,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    let config = Self::from_lookup(|key| env::var(key).ok())?;
    tracing::info!("Application configuration loaded successfully.");
    Ok(config)
  }

  /// Builds the configuration from any key/value source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = lookup("SERVER_PORT")
      .unwrap_or_else(|| "3001".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let upload_dir = PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| "./uploads".to_string()));
    let output_dir = PathBuf::from(lookup("OUTPUT_DIR").unwrap_or_else(|| "./outputs".to_string()));
    let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
      Some(raw) => raw
        .parse::<usize>()
        .map_err(|e| AppError::Config(format!("Invalid MAX_UPLOAD_BYTES: {}", e)))?,
      None => DEFAULT_MAX_UPLOAD_BYTES,
    };
    let pipeline_profile = match lookup("PIPELINE_PROFILE") {
      Some(raw) => raw.parse::<PipelineProfile>()?,
      None => PipelineProfile::default(),
    };
    let enable_cors = match lookup("ENABLE_CORS") {
      Some(raw) => parse_flag("ENABLE_CORS", &raw)?,
      None => true,
    };
    let shutdown_grace = match lookup("SHUTDOWN_GRACE_SECS") {
      Some(raw) => raw
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| AppError::Config(format!("Invalid SHUTDOWN_GRACE_SECS: {}", e)))?,
      None => DEFAULT_SHUTDOWN_GRACE,
    };

    Ok(Self {
      server_host,
      server_port,
      upload_dir,
      output_dir,
      max_upload_bytes,
      pipeline_profile,
      enable_cors,
      shutdown_grace,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }

  /// Preview-paced configuration rooted in a scratch directory.
  #[cfg(test)]
  pub fn for_tests(root: &std::path::Path) -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      upload_dir: root.join("uploads"),
      output_dir: root.join("outputs"),
      max_upload_bytes: 1024,
      pipeline_profile: PipelineProfile::Preview,
      enable_cors: true,
      shutdown_grace: Duration::from_secs(5),
    }
  }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    other => Err(AppError::Config(format!("Invalid {}: '{}'", key, other))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn defaults_apply_when_unset() {
    let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config.bind_address(), "127.0.0.1:3001");
    assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
    assert_eq!(config.output_dir, PathBuf::from("./outputs"));
    assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    assert_eq!(config.pipeline_profile, PipelineProfile::Standard);
    assert!(config.enable_cors);
    assert_eq!(config.shutdown_grace, DEFAULT_SHUTDOWN_GRACE);
  }

  #[test]
  fn values_are_read_from_the_source() {
    let config = AppConfig::from_lookup(lookup_from(&[
      ("SERVER_HOST", "0.0.0.0"),
      ("SERVER_PORT", "8080"),
      ("UPLOAD_DIR", "/data/in"),
      ("OUTPUT_DIR", "/data/out"),
      ("MAX_UPLOAD_BYTES", "1024"),
      ("PIPELINE_PROFILE", "preview"),
      ("ENABLE_CORS", "off"),
      ("SHUTDOWN_GRACE_SECS", "2"),
    ]))
    .unwrap();
    assert_eq!(config.bind_address(), "0.0.0.0:8080");
    assert_eq!(config.upload_dir, PathBuf::from("/data/in"));
    assert_eq!(config.max_upload_bytes, 1024);
    assert_eq!(config.pipeline_profile, PipelineProfile::Preview);
    assert!(!config.enable_cors);
    assert_eq!(config.shutdown_grace, Duration::from_secs(2));
  }

  #[test]
  fn invalid_values_are_config_errors() {
    assert!(matches!(
      AppConfig::from_lookup(lookup_from(&[("SERVER_PORT", "http")])),
      Err(AppError::Config(_))
    ));
    assert!(matches!(
      AppConfig::from_lookup(lookup_from(&[("PIPELINE_PROFILE", "ultra")])),
      Err(AppError::Config(_))
    ));
    assert!(matches!(
      AppConfig::from_lookup(lookup_from(&[("ENABLE_CORS", "maybe")])),
      Err(AppError::Config(_))
    ));
  }
}
