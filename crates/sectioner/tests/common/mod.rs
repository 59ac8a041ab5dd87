//! Shared fixtures for integration tests: a minimal PDF builder and
//! scripted capability implementations.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lopdf::{dictionary, Document, Object, Stream};

use sectioner::db::{document_repo, Database, DocumentStatus};
use sectioner::model::{ModelClient, ModelError};
use sectioner::ocr::{OcrError, OcrJobStatus, PageText, TextExtractionClient};

/// Builds a minimal valid PDF with one page per entry, each carrying the
/// given text in its content stream.
pub fn pdf_with_pages(texts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in texts {
        let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text);
        let content_id = doc.add_object(Object::Stream(Stream::new(
            dictionary! {},
            content.into_bytes(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("failed to serialize test PDF");
    bytes
}

/// Model returning canned responses in order; fails once the script runs dry.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedModel {
    pub fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn propose(&self, _prompt: &str) -> Result<String, ModelError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(ModelError::EmptyResponse)
    }
}

/// Text detection that reports `IN_PROGRESS` a fixed number of polls per
/// job before succeeding with canned pages.
pub struct ScriptedOcr {
    pages: Vec<PageText>,
    in_progress_polls: u32,
    jobs: Mutex<HashMap<String, u32>>,
}

impl ScriptedOcr {
    pub fn new(pages: Vec<PageText>, in_progress_polls: u32) -> Arc<Self> {
        Arc::new(Self {
            pages,
            in_progress_polls,
            jobs: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl TextExtractionClient for ScriptedOcr {
    async fn submit(&self, _key: &str) -> Result<String, OcrError> {
        let job_id = uuid::Uuid::new_v4().to_string();
        self.jobs
            .lock()
            .unwrap()
            .insert(job_id.clone(), self.in_progress_polls);
        Ok(job_id)
    }

    async fn poll(&self, job_id: &str) -> Result<OcrJobStatus, OcrError> {
        let mut jobs = self.jobs.lock().unwrap();
        let remaining = jobs
            .get_mut(job_id)
            .ok_or_else(|| OcrError::UnknownJob(job_id.to_string()))?;
        if *remaining > 0 {
            *remaining -= 1;
            Ok(OcrJobStatus::InProgress)
        } else {
            Ok(OcrJobStatus::Succeeded(self.pages.clone()))
        }
    }
}

/// Text detection whose jobs never finish.
pub struct StalledOcr;

#[async_trait]
impl TextExtractionClient for StalledOcr {
    async fn submit(&self, _key: &str) -> Result<String, OcrError> {
        Ok("stalled-job".to_string())
    }

    async fn poll(&self, _job_id: &str) -> Result<OcrJobStatus, OcrError> {
        Ok(OcrJobStatus::InProgress)
    }
}

/// Polls the store until the record reaches the wanted status. Panics
/// after the deadline with the last observed state.
pub async fn wait_for_status(
    db: &Database,
    document_id: &str,
    wanted: DocumentStatus,
    deadline: Duration,
) {
    let started = std::time::Instant::now();
    loop {
        let record = document_repo::find_by_id(db, document_id).unwrap();
        if let Some(ref record) = record {
            if record.status == wanted {
                return;
            }
        }
        if started.elapsed() > deadline {
            panic!(
                "'{}' never reached {:?}; last state: {:?}",
                document_id, wanted, record
            );
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
