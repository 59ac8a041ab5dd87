//! Structured extraction for a single split section.
//!
//! Second model call of the pipeline: recognized section text in, a
//! document-type label plus an open field mapping out. Applies the same
//! embedded-JSON tolerance as plan validation; unusable output keeps the
//! raw text so the caller can persist it for diagnostics.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{extract_embedded_json, prompts, ModelClient, ModelError};

/// Validated extraction result for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionExtraction {
    pub document_type: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum SectionExtractorError {
    #[error("Model call failed: {0}")]
    Model(#[from] ModelError),

    /// The model answered, but the answer is unusable. The raw text rides
    /// along so it can be retained on the failed record.
    #[error("Unusable model output: {reason}")]
    Invalid { reason: String, raw: String },
}

pub struct SectionExtractor {
    model: Arc<dyn ModelClient>,
}

impl SectionExtractor {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Classifies a section and extracts its fields from recognized text.
    pub async fn extract(&self, section_text: &str) -> Result<SectionExtraction, SectionExtractorError> {
        let prompt = prompts::section_extraction_prompt(section_text);
        let raw = self.model.propose(&prompt).await?;
        parse_extraction(&raw).map_err(|reason| SectionExtractorError::Invalid {
            reason,
            raw,
        })
    }
}

/// Parses raw model output into a [`SectionExtraction`].
pub fn parse_extraction(raw: &str) -> Result<SectionExtraction, String> {
    let json = extract_embedded_json(raw).ok_or_else(|| "no JSON object in output".to_string())?;
    let extraction: SectionExtraction =
        serde_json::from_str(json).map_err(|e| format!("malformed extraction JSON: {}", e))?;
    if extraction.document_type.trim().is_empty() {
        return Err("empty document_type".to_string());
    }
    Ok(extraction)
}
