// stereoflow/src/pipeline/mod.rs

//! Defines the `Pipeline` wiring and the `PipelineRunner` that executes it.

pub mod definition;
pub mod execution;

pub use definition::Pipeline;
pub use execution::PipelineRunner;
