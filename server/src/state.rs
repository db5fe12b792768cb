// stereoflow/server/src/state.rs
use crate::config::AppConfig;
use std::sync::Arc;
use stereoflow::Orchestrator;

#[derive(Clone)]
pub struct AppState {
  pub orchestrator: Orchestrator,
  pub config: Arc<AppConfig>, // Share loaded config
}
