//! Generative-model capability.
//!
//! The model is consumed as an abstract `propose` call: prompt in, free
//! text out. Responses are expected to contain JSON but are never trusted
//! to be well-formed. Every caller goes through [`response::extract_embedded_json`]
//! and validates before acting.

use async_trait::async_trait;
use thiserror::Error;

pub mod ollama;
pub mod prompts;
pub mod response;

pub use ollama::OllamaClient;
pub use response::extract_embedded_json;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// A single generative call. One attempt per invocation: stage-level
/// failures are terminal for the calling pipeline, so there is no retry
/// or backoff here.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn propose(&self, prompt: &str) -> Result<String, ModelError>;
}
