// stereoflow/src/lib.rs

//! stereoflow: an asynchronous job orchestrator for VR180 video conversion.
//!
//! A job is one uploaded video pushed through a fixed sequence of stages:
//!  - Frame extraction
//!  - Depth estimation
//!  - Stereo synthesis
//!  - Outpainting
//!  - Foveated blur
//!  - Upscaling
//!
//! The crate tracks per-stage progress while each job runs in its own
//! background task. The media work itself is done by `StageExecutor`
//! implementations supplied by the application.

pub mod artifact;
pub mod core;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod pipeline;
pub mod registry;

// --- Re-exports for the Public API ---

pub use crate::artifact::{ArtifactRef, ArtifactStore};
pub use crate::core::job::{Job, JobId, JobStatus, JobSummary, Outcome};
pub use crate::core::stage::{Stage, StageName, StageStatus};

pub use crate::executor::{for_each_item, FnExecutor, ProgressReporter, StageExecutor, StageInput, StageOutput};

pub use crate::pipeline::{Pipeline, PipelineRunner};

pub use crate::error::{ExecutorError, JobError, JobResult, PipelineError};

pub use crate::orchestrator::Orchestrator;
pub use crate::registry::JobRegistry;

/*
    Typical wiring:
    1. Implement `StageExecutor` for each stage (or use `Pipeline::on_fn` closures).
    2. Build a `Pipeline` with an executor for every `StageName`.
    3. Inside a tokio runtime, create an `Orchestrator` from it.
    4. `submit(ArtifactRef)` returns a `JobId` immediately.
    5. Poll `status(id)`; once completed, `result(id)` yields the output artifact.
*/
