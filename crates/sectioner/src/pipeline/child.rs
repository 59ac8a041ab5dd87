//! Child pipeline: OCR one split artifact and extract its structured data.
//!
//! SubmitOCR -> WaitOCR -> FetchOCRAndExtract. Mirrors the parent's
//! submit/poll shape but ends in a section extraction instead of a split.

use std::sync::Arc;

use tracing::Instrument;

use crate::db::{document_repo, Database, DocumentStatus};
use crate::extractor::{SectionExtractor, SectionExtractorError};
use crate::ocr::{self, TextExtractionClient};

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::now_rfc3339;
use super::poll::await_text_detection;

pub struct ChildPipeline {
    db: Database,
    ocr: Arc<dyn TextExtractionClient>,
    extractor: SectionExtractor,
    config: PipelineConfig,
}

impl ChildPipeline {
    pub fn new(
        db: Database,
        ocr: Arc<dyn TextExtractionClient>,
        extractor: SectionExtractor,
        config: PipelineConfig,
    ) -> Self {
        Self {
            db,
            ocr,
            extractor,
            config,
        }
    }

    /// Runs the child pipeline for one artifact under the wall-clock
    /// ceiling. All failures end as a FAILED write on the record.
    pub async fn run(&self, document_id: &str) {
        let span = tracing::info_span!("child_pipeline", document_id = %document_id);
        async {
            let outcome =
                tokio::time::timeout(self.config.child_ceiling, self.execute(document_id)).await;
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(_) => Some(PipelineError::Ceiling {
                    limit: self.config.child_ceiling,
                }),
            };
            match failure {
                None => tracing::info!("child pipeline complete"),
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

        // FetchOCRAndExtract
        let text = ocr::concat_pages(&pages);
        let extraction = match self.extractor.extract(&text).await {
            Ok(extraction) => extraction,
            Err(SectionExtractorError::Model(e)) => return Err(e.into()),
            Err(SectionExtractorError::Invalid { reason, raw }) => {
                return Err(PipelineError::ExtractionRejected { reason, raw })
            }
        };

        let fields_json = serde_json::to_string(&extraction.fields)?;
        document_repo::record_extraction(
            &self.db,
            document_id,
            &fields_json,
            &extraction.document_type,
            &now_rfc3339(),
        )?;
        tracing::info!(document_type = %extraction.document_type, "section extraction complete");
        Ok(())
    }

    fn fail(&self, document_id: &str, error: &PipelineError) {
        tracing::error!(%error, "child pipeline failed");
        if let Err(db_err) = document_repo::record_failure(
            &self.db,
            document_id,
            &error.to_string(),
            error.diagnostic(),
            &now_rfc3339(),
        ) {
            tracing::error!(%db_err, "failed to record pipeline failure");
        }
    }
}
