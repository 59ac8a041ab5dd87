//! Event routing: storage creation events in, pipeline instances out.
//!
//! The key-prefix partition decides which pipeline an event feeds. Upload
//! keys start parents, derived keys start children, and the two can never
//! collide, so a split artifact cannot re-enter the parent pipeline. The
//! pipelines themselves never need to know about this guard.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::db::{document_repo, Database, DocumentRecord, DocumentStatus};
use crate::extractor::SectionExtractor;
use crate::model::ModelClient;
use crate::ocr::TextExtractionClient;
use crate::storage::{self, ObjectStore, StorageEvent};

use super::child::ChildPipeline;
use super::config::PipelineConfig;
use super::now_rfc3339;
use super::parent::ParentPipeline;

/// Which pipeline an event feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Parent,
    Child,
}

/// Classifies a storage key by namespace. The two triggers are mutually
/// exclusive by construction; keys outside both namespaces are ignored.
pub fn classify(key: &str) -> Option<Trigger> {
    if storage::is_upload_key(key) {
        Some(Trigger::Parent)
    } else if storage::is_derived_key(key) {
        Some(Trigger::Child)
    } else {
        None
    }
}

/// Consumes storage creation events and spawns one independent pipeline
/// task per event. Cheap to clone; every handler task gets its own copy.
#[derive(Clone)]
pub struct Dispatcher {
    db: Database,
    store: Arc<dyn ObjectStore>,
    ocr: Arc<dyn TextExtractionClient>,
    model: Arc<dyn ModelClient>,
    config: PipelineConfig,
}

impl Dispatcher {
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

    /// Consumes events until the stream closes. Subscribe before the first
    /// `put` you care about; broadcast channels do not replay.
    pub async fn run(self, mut events: broadcast::Receiver<StorageEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let dispatcher = self.clone();
                    tokio::spawn(async move {
                        dispatcher.handle_event(&event).await;
                    });
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "storage event stream lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::info!("storage event stream closed; dispatcher stopping");
    }

    /// Routes one creation event. Runs the selected pipeline to completion.
    pub async fn handle_event(&self, event: &StorageEvent) {
        match classify(&event.key) {
            Some(Trigger::Parent) => self.start_parent(&event.key).await,
            Some(Trigger::Child) => self.start_child(&event.key).await,
            None => {
                tracing::debug!(key = %event.key, "event outside known namespaces ignored")
            }
        }
    }

    async fn start_parent(&self, key: &str) {
        let record = DocumentRecord::new_parent(key, now_rfc3339());
        let created = match document_repo::insert_if_absent(&self.db, &record) {
            Ok(created) => created,
            Err(e) => {
                tracing::error!(key, %e, "failed to create parent record");
                return;
            }
        };
        if !created {
            // Duplicate notification. Only re-enter if the record never
            // advanced past creation.
            match document_repo::find_by_id(&self.db, key) {
                Ok(Some(existing)) if existing.status == DocumentStatus::Received => {}
                Ok(_) => {
                    tracing::debug!(key, "duplicate upload event ignored");
                    return;
                }
                Err(e) => {
                    tracing::error!(key, %e, "failed to read parent record");
                    return;
                }
            }
        }

        ParentPipeline::new(
            self.db.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.ocr),
            Arc::clone(&self.model),
            self.config.clone(),
        )
        .run(key)
        .await;
    }

    async fn start_child(&self, key: &str) {
        // Child records are created by the split stage before the artifact
        // lands; an event without one is not ours to process.
        match document_repo::find_by_id(&self.db, key) {
            Ok(Some(existing)) if existing.status == DocumentStatus::Received => {}
            Ok(Some(_)) => {
                tracing::debug!(key, "duplicate artifact event ignored");
                return;
            }
            Ok(None) => {
                tracing::warn!(key, "artifact event without a child record ignored");
                return;
            }
            Err(e) => {
                tracing::error!(key, %e, "failed to read child record");
                return;
            }
        }

        ChildPipeline::new(
            self.db.clone(),
            Arc::clone(&self.ocr),
            SectionExtractor::new(Arc::clone(&self.model)),
            self.config.clone(),
        )
        .run(key)
        .await;
    }
}
