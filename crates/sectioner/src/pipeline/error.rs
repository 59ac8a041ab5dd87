use std::time::Duration;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::model::ModelError;
use crate::ocr::OcrError;
use crate::plan::PlanError;
use crate::splitter::SplitError;
use crate::storage::StoreError;

/// Everything that can end a pipeline instance. Each variant is converted
/// into a `FAILED` status write at the instance boundary; nothing
/// propagates back to the event source.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Text detection failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Text detection job failed: {0}")]
    OcrJobFailed(String),

    #[error("Model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("Splitting plan rejected: {source}")]
    PlanRejected {
        #[source]
        source: PlanError,
        raw: String,
    },

    #[error("Section extraction rejected: {reason}")]
    ExtractionRejected { reason: String, raw: String },

    #[error("Document split failed: {0}")]
    Split(#[from] SplitError),

    #[error("Database failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StoreError),

    #[error("Failed to encode result JSON: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Text detection still in progress after {attempts} polls")]
    PollExhausted { attempts: u32 },

    #[error("Pipeline exceeded its wall-clock ceiling of {limit:?}")]
    Ceiling { limit: Duration },
}

impl PipelineError {
    /// Raw model output to retain on the failed record, for failures that
    /// carry it.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::PlanRejected { raw, .. } | Self::ExtractionRejected { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
