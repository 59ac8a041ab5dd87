//! Parent pipeline: analyze an uploaded document and split it.
//!
//! SubmitOCR -> WaitOCR -> FetchOCRAndAnalyze -> ValidatePlan -> Split.
//! Any stage failure, the poll bound, or the wall-clock ceiling routes the
//! record to FAILED; nothing is thrown back to the event source.

use std::sync::Arc;

use tracing::Instrument;

use crate::db::{document_repo, Database, DocumentRecord, DocumentStatus};
use crate::model::{prompts, ModelClient};
use crate::ocr::{self, TextExtractionClient};
use crate::plan;
use crate::splitter;
use crate::storage::ObjectStore;

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::now_rfc3339;
use super::poll::await_text_detection;

pub struct ParentPipeline {
    db: Database,
    store: Arc<dyn ObjectStore>,
    ocr: Arc<dyn TextExtractionClient>,
    model: Arc<dyn ModelClient>,
    config: PipelineConfig,
}

impl ParentPipeline {
    pub fn new(
        db: Database,
        store: Arc<dyn ObjectStore>,
        ocr: Arc<dyn TextExtractionClient>,
        model: Arc<dyn ModelClient>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            db,
            store,
            ocr,
            model,
            config,
        }
    }

    /// Runs the full parent pipeline for one document under the wall-clock
    /// ceiling. All failures end as a FAILED write on the record.
    pub async fn run(&self, document_id: &str) {
        let span = tracing::info_span!("parent_pipeline", document_id = %document_id);
        async {
            let outcome =
                tokio::time::timeout(self.config.parent_ceiling, self.execute(document_id)).await;
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(_) => Some(PipelineError::Ceiling {
                    limit: self.config.parent_ceiling,
                }),
            };
            match failure {
                None => tracing::info!("parent pipeline complete"),
                Some(error) => self.fail(document_id, &error),
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, document_id: &str) -> Result<(), PipelineError> {
        // SubmitOCR
        let job_id = self.ocr.submit(document_id).await?;
        document_repo::transition_status(
            &self.db,
            document_id,
            DocumentStatus::TextractInProgress,
            &now_rfc3339(),
        )?;
        tracing::info!(%job_id, "text detection submitted");

        // WaitOCR
        let pages = await_text_detection(self.ocr.as_ref(), &job_id, &self.config).await?;

        // FetchOCRAndAnalyze
        let text = ocr::concat_pages(&pages);
        let raw = self
            .model
            .propose(&prompts::split_plan_prompt(&text))
            .await?;

        // ValidatePlan
        let plan = plan::validate(&raw).map_err(|source| PipelineError::PlanRejected {
            source,
            raw: raw.clone(),
        })?;
        document_repo::transition_status(
            &self.db,
            document_id,
            DocumentStatus::AnalysisComplete,
            &now_rfc3339(),
        )?;
        tracing::info!(sections = plan.sections().len(), "splitting plan validated");

        // Split. Artifacts are fully staged in memory before any record or
        // object write, so a failed section leaves no partial child set.
        let bytes = self.store.get(document_id).await?;
        let artifacts = splitter::split_document(document_id, &bytes, &plan)?;

        let created_at = now_rfc3339();
        for artifact in &artifacts {
            document_repo::insert_if_absent(
                &self.db,
                &DocumentRecord::new_child(
                    artifact.key.as_str(),
                    document_id,
                    created_at.as_str(),
                ),
            )?;
        }
        // Records exist before the artifacts land, so each artifact's
        // creation event finds its child record.
        for artifact in &artifacts {
            self.store.put(&artifact.key, &artifact.bytes).await?;
        }

        let plan_json = serde_json::to_string(&plan)?;
        document_repo::record_split(&self.db, document_id, &plan_json, &now_rfc3339())?;
        tracing::info!(children = artifacts.len(), "document split complete");
        Ok(())
    }

    fn fail(&self, document_id: &str, error: &PipelineError) {
        tracing::error!(%error, "parent pipeline failed");
        // The extraction field belongs to children; a parent's offending
        // raw output rides along in the recorded cause instead.
        let cause = match error.diagnostic() {
            Some(raw) => format!("{}\nraw model output:\n{}", error, raw),
            None => error.to_string(),
        };
        if let Err(db_err) =
            document_repo::record_failure(&self.db, document_id, &cause, None, &now_rfc3339())
        {
            tracing::error!(%db_err, "failed to record pipeline failure");
        }
    }
}
