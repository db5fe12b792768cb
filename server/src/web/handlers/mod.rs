// stereoflow/server/src/web/handlers/mod.rs

pub mod job_handlers;
pub mod upload_handlers;
