//! In-process text detection service.
//!
//! Implements the async submit/poll contract with a job registry: `submit`
//! snapshots the object bytes, registers the job as in-progress and hands
//! the page walk to a blocking worker; `poll` returns the registry entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::storage::ObjectStore;

use super::{pdf_text, OcrError, OcrJobStatus, TextExtractionClient};

pub struct LocalTextExtraction {
    store: Arc<dyn ObjectStore>,
    jobs: Arc<Mutex<HashMap<String, OcrJobStatus>>>,
}

impl LocalTextExtraction {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn set_status(jobs: &Mutex<HashMap<String, OcrJobStatus>>, job_id: &str, status: OcrJobStatus) {
        if let Ok(mut guard) = jobs.lock() {
            guard.insert(job_id.to_string(), status);
        }
    }
}

#[async_trait]
impl TextExtractionClient for LocalTextExtraction {
    async fn submit(&self, key: &str) -> Result<String, OcrError> {
        let bytes = self.store.get(key).await?;
        let job_id = uuid::Uuid::new_v4().to_string();
        Self::set_status(&self.jobs, &job_id, OcrJobStatus::InProgress);

        tracing::debug!(key, %job_id, "submitted text detection job");

        let jobs = Arc::clone(&self.jobs);
        let task_job_id = job_id.clone();
        tokio::spawn(async move {
            let outcome =
                tokio::task::spawn_blocking(move || pdf_text::extract_page_texts(&bytes)).await;
            let status = match outcome {
                Ok(Ok(pages)) => OcrJobStatus::Succeeded(pages),
                Ok(Err(reason)) => OcrJobStatus::Failed(reason),
                Err(e) => OcrJobStatus::Failed(format!("extraction task panicked: {}", e)),
            };
            Self::set_status(&jobs, &task_job_id, status);
        });

        Ok(job_id)
    }

    async fn poll(&self, job_id: &str) -> Result<OcrJobStatus, OcrError> {
        let guard = self
            .jobs
            .lock()
            .map_err(|_| OcrError::Submit("job registry poisoned".to_string()))?;
        guard
            .get(job_id)
            .cloned()
            .ok_or_else(|| OcrError::UnknownJob(job_id.to_string()))
    }
}
