//! Read-side facade over the result store, consumed by the dashboard.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::{document_repo, stats_repo, Database, DatabaseError, DocumentRecord, StoreStats};
use crate::storage::UPLOAD_PREFIX;

/// How long an upload target stays valid.
pub const UPLOAD_TARGET_TTL_MINUTES: i64 = 15;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Database failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid upload file name '{0}'")]
    InvalidFileName(String),
}

/// A parent record together with its children, children in key order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    pub parent: DocumentRecord,
    pub children: Vec<DocumentRecord>,
}

/// A time-limited handle for depositing a new upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    pub key: String,
    pub upload_token: String,
    pub expires_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Clone)]
pub struct QueryApi {
    db: Database,
}

impl QueryApi {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Parent record summaries, newest upload first.
    pub fn list_documents(&self) -> Result<Vec<DocumentRecord>, QueryError> {
        Ok(document_repo::list_parents(&self.db)?)
    }

    /// A parent and all of its children, or `None` for an unknown id.
    pub fn get_document_detail(
        &self,
        document_id: &str,
    ) -> Result<Option<DocumentDetail>, QueryError> {
        let Some(parent) = document_repo::find_by_id(&self.db, document_id)? else {
            return Ok(None);
        };
        let children = document_repo::find_children(&self.db, document_id)?;
        Ok(Some(DocumentDetail { parent, children }))
    }

    /// Store-wide aggregates for the reports view.
    pub fn get_stats(&self) -> Result<StoreStats, QueryError> {
        Ok(stats_repo::collect(&self.db)?)
    }

    /// A deposit handle under the upload namespace for a new file. The
    /// file name must be a bare name: no separators, no traversal.
    pub fn get_upload_target(&self, file_name: &str) -> Result<UploadTarget, QueryError> {
        let name = file_name.trim();
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || name.starts_with('.')
        {
            return Err(QueryError::InvalidFileName(file_name.to_string()));
        }

        let expires_at = (Utc::now() + chrono::Duration::minutes(UPLOAD_TARGET_TTL_MINUTES))
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        Ok(UploadTarget {
            key: format!("{}{}", UPLOAD_PREFIX, name),
            upload_token: uuid::Uuid::new_v4().to_string(),
            expires_at,
            content_type: mime_guess::from_path(name).first().map(|m| m.to_string()),
        })
    }
}
