//! Text-extraction capability: an asynchronous job interface over stored
//! documents. Submission is non-blocking; callers poll for completion.

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::StoreError;

pub mod local;
pub mod pdf_text;

pub use local::LocalTextExtraction;

/// Recognized text for one page, 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

/// Snapshot of an extraction job.
#[derive(Debug, Clone)]
pub enum OcrJobStatus {
    InProgress,
    Succeeded(Vec<PageText>),
    Failed(String),
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Text detection submit failed: {0}")]
    Submit(String),

    #[error("Unknown text detection job '{0}'")]
    UnknownJob(String),

    #[error("Storage failed: {0}")]
    Storage(#[from] StoreError),
}

/// Asynchronous text detection over a stored object.
///
/// `submit` returns immediately with a job id; the recognition work happens
/// elsewhere. A submit failure is surfaced to the caller as-is; there is no
/// local retry. `poll` is expected to be called repeatedly until the job
/// leaves `InProgress`.
#[async_trait]
pub trait TextExtractionClient: Send + Sync {
    async fn submit(&self, key: &str) -> Result<String, OcrError>;
    async fn poll(&self, job_id: &str) -> Result<OcrJobStatus, OcrError>;
}

/// Joins recognized pages into one text blob, page order preserved.
pub fn concat_pages(pages: &[PageText]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(&page.text);
        if !text.ends_with('\n') {
            text.push('\n');
        }
    }
    text
}
