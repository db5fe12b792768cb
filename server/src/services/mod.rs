// stereoflow/server/src/services/mod.rs

pub mod artifact_store;
pub mod shutdown;
pub mod simulated_stage;
pub mod upload;
