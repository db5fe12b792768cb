// stereoflow/src/executor/items.rs

//! Best-effort per-item processing for stages that work frame by frame.

use super::ProgressReporter;
use crate::core::stage::StageName;
use crate::error::ExecutorError;
use std::fmt::Display;
use std::future::Future;
use tracing::{event, Level};

/// Runs `func` over every item in order, reporting proportional progress.
///
/// A failing item is logged and skipped. The stage only fails when nothing
/// usable came out: `FrameExtractionEmpty` for frame extraction, otherwise
/// `NoUsableOutput`. Returns the successful results in item order.
pub async fn for_each_item<I, F, Fut, T, E>(
  progress: &ProgressReporter,
  items: I,
  mut func: F,
) -> Result<Vec<T>, ExecutorError>
where
  I: IntoIterator,
  I::IntoIter: ExactSizeIterator,
  F: FnMut(I::Item) -> Fut,
  Fut: Future<Output = Result<T, E>>,
  E: Display,
{
  let stage = progress.stage();
  let items = items.into_iter();
  let total = items.len();
  let mut produced = Vec::with_capacity(total);

  for (idx, item) in items.enumerate() {
    match func(item).await {
      Ok(value) => produced.push(value),
      Err(e) => {
        event!(Level::WARN, job_id = %progress.job_id(), %stage, item = idx, error = %e, "Item failed; skipping.");
      }
    }
    progress.report_fraction(idx + 1, total);
  }

  if produced.is_empty() {
    event!(Level::ERROR, job_id = %progress.job_id(), %stage, attempted = total, "No item produced output.");
    return Err(match stage {
      StageName::FrameExtraction => ExecutorError::FrameExtractionEmpty,
      _ => ExecutorError::NoUsableOutput {
        stage,
        attempted: total,
      },
    });
  }

  if produced.len() < total {
    event!(
      Level::INFO,
      job_id = %progress.job_id(),
      %stage,
      succeeded = produced.len(),
      attempted = total,
      "Stage finished with skipped items."
    );
  }
  Ok(produced)
}
