//! Bounded text-detection poll loop, shared by both pipelines.

use crate::ocr::{OcrJobStatus, PageText, TextExtractionClient};

use super::config::PipelineConfig;
use super::error::PipelineError;

/// Polls a detection job until it completes, sleeping the configured delay
/// before every poll. Bounded by `max_poll_attempts`; exhausting the bound
/// is a timeout failure.
pub(crate) async fn await_text_detection(
    ocr: &dyn TextExtractionClient,
    job_id: &str,
    config: &PipelineConfig,
) -> Result<Vec<PageText>, PipelineError> {
    for attempt in 1..=config.max_poll_attempts {
        tokio::time::sleep(config.poll_delay).await;
        match ocr.poll(job_id).await? {
            OcrJobStatus::InProgress => {
                tracing::debug!(job_id, attempt, "text detection still in progress");
            }
            OcrJobStatus::Succeeded(pages) => return Ok(pages),
            OcrJobStatus::Failed(reason) => return Err(PipelineError::OcrJobFailed(reason)),
        }
    }
    Err(PipelineError::PollExhausted {
        attempts: config.max_poll_attempts,
    })
}
