//! Document repository: CRUD operations for the `documents` table.
//!
//! Parent and child records share the table; children carry a
//! `parent_document_id` (covered by a secondary index). Status updates go
//! through [`transition_status`] and the `record_*` helpers, which enforce
//! the monotonic status order.

use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use super::{Database, DatabaseError};

/// Processing status of a document record.
///
/// Serialized as the exact strings the dashboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    #[serde(rename = "RECEIVED")]
    Received,
    #[serde(rename = "TEXTRACT_IN_PROGRESS")]
    TextractInProgress,
    #[serde(rename = "ANALYSIS_COMPLETE")]
    AnalysisComplete,
    #[serde(rename = "SPLIT_COMPLETE")]
    SplitComplete,
    #[serde(rename = "EXTRACTION_COMPLETE")]
    ExtractionComplete,
    #[serde(rename = "FAILED")]
    Failed,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::TextractInProgress => "TEXTRACT_IN_PROGRESS",
            Self::AnalysisComplete => "ANALYSIS_COMPLETE",
            Self::SplitComplete => "SPLIT_COMPLETE",
            Self::ExtractionComplete => "EXTRACTION_COMPLETE",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RECEIVED" => Some(Self::Received),
            "TEXTRACT_IN_PROGRESS" => Some(Self::TextractInProgress),
            "ANALYSIS_COMPLETE" => Some(Self::AnalysisComplete),
            "SPLIT_COMPLETE" => Some(Self::SplitComplete),
            "EXTRACTION_COMPLETE" => Some(Self::ExtractionComplete),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Position in the fixed forward order. `FAILED` has no rank: it is
    /// reachable from any non-terminal status and terminal once reached.
    fn rank(self) -> u8 {
        match self {
            Self::Received => 0,
            Self::TextractInProgress => 1,
            Self::AnalysisComplete => 2,
            Self::SplitComplete => 3,
            Self::ExtractionComplete => 4,
            Self::Failed => u8::MAX,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Failed
    }

    /// Whether a record may move from `self` to `to`. Forward skips are
    /// allowed (children go TEXTRACT_IN_PROGRESS -> EXTRACTION_COMPLETE);
    /// regressions are not.
    pub fn can_advance_to(self, to: Self) -> bool {
        if self == Self::Failed {
            return false;
        }
        if to == Self::Failed {
            return true;
        }
        to.rank() > self.rank()
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted document record. Parents describe uploaded files; children
/// describe split section artifacts and link back via `parent_document_id`.
///
/// JSON shape (camelCase, optionals omitted) matches what the dashboard
/// consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_document_id: Option<String>,
    pub status: DocumentStatus,
    pub received_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splitting_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentRecord {
    /// A fresh parent record for an uploaded file.
    pub fn new_parent(document_id: impl Into<String>, received_at: impl Into<String>) -> Self {
        let received_at = received_at.into();
        Self {
            document_id: document_id.into(),
            parent_document_id: None,
            status: DocumentStatus::Received,
            updated_at: received_at.clone(),
            received_at,
            splitting_plan: None,
            extracted_data: None,
            document_type: None,
            error: None,
        }
    }

    /// A fresh child record for a split artifact.
    pub fn new_child(
        document_id: impl Into<String>,
        parent_document_id: impl Into<String>,
        received_at: impl Into<String>,
    ) -> Self {
        let mut record = Self::new_parent(document_id, received_at);
        record.parent_document_id = Some(parent_document_id.into());
        record
    }

    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let status_raw: String = row.get("status")?;
        let status = DocumentStatus::parse(&status_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown document status '{}'", status_raw).into(),
            )
        })?;
        Ok(Self {
            document_id: row.get("document_id")?,
            parent_document_id: row.get("parent_document_id")?,
            status,
            received_at: row.get("received_at")?,
            updated_at: row.get("updated_at")?,
            splitting_plan: row.get("splitting_plan")?,
            extracted_data: row.get("extracted_data")?,
            document_type: row.get("document_type")?,
            error: row.get("error")?,
        })
    }
}

/// Inserts a record unless one with the same `document_id` already exists.
/// Returns `true` when the row was newly created. `received_at` is written
/// once here and never touched by any update path.
pub fn insert_if_absent(db: &Database, record: &DocumentRecord) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "INSERT OR IGNORE INTO documents
             (document_id, parent_document_id, status, received_at, updated_at,
              splitting_plan, extracted_data, document_type, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.document_id,
                record.parent_document_id,
                record.status.as_str(),
                record.received_at,
                record.updated_at,
                record.splitting_plan,
                record.extracted_data,
                record.document_type,
                record.error,
            ],
        )?;
        Ok(changed > 0)
    })
}

/// Finds a record by its document id.
pub fn find_by_id(db: &Database, document_id: &str) -> Result<Option<DocumentRecord>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM documents WHERE document_id = ?1")?;
        let mut rows = stmt.query_map(params![document_id], DocumentRecord::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Lists parent records, newest upload first.
pub fn list_parents(db: &Database) -> Result<Vec<DocumentRecord>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM documents WHERE parent_document_id IS NULL
             ORDER BY received_at DESC, document_id",
        )?;
        let rows: Vec<DocumentRecord> = stmt
            .query_map([], DocumentRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Returns all children of a parent in deterministic (key) order,
/// independent of the order their pipelines completed in.
pub fn find_children(
    db: &Database,
    parent_document_id: &str,
) -> Result<Vec<DocumentRecord>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM documents WHERE parent_document_id = ?1 ORDER BY document_id",
        )?;
        let rows: Vec<DocumentRecord> = stmt
            .query_map(params![parent_document_id], DocumentRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

fn current_status(
    conn: &rusqlite::Connection,
    document_id: &str,
) -> Result<DocumentStatus, DatabaseError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT status FROM documents WHERE document_id = ?1",
            params![document_id],
            |r| r.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    let raw = raw.ok_or_else(|| DatabaseError::NotFound(document_id.to_string()))?;
    DocumentStatus::parse(&raw).ok_or_else(|| {
        DatabaseError::Sqlite(rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown document status '{}'", raw).into(),
        ))
    })
}

fn guard_transition(
    conn: &rusqlite::Connection,
    document_id: &str,
    to: DocumentStatus,
) -> Result<(), DatabaseError> {
    let from = current_status(conn, document_id)?;
    if !from.can_advance_to(to) {
        return Err(DatabaseError::InvalidTransition {
            document_id: document_id.to_string(),
            from: from.as_str(),
            to: to.as_str(),
        });
    }
    Ok(())
}

/// Moves a record forward along the status order. Regressions and writes
/// to terminal records are rejected.
pub fn transition_status(
    db: &Database,
    document_id: &str,
    to: DocumentStatus,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        guard_transition(conn, document_id, to)?;
        conn.execute(
            "UPDATE documents SET status = ?2, updated_at = ?3 WHERE document_id = ?1",
            params![document_id, to.as_str(), updated_at],
        )?;
        Ok(())
    })
}

/// Persists the validated splitting plan and marks the parent `SPLIT_COMPLETE`.
pub fn record_split(
    db: &Database,
    document_id: &str,
    plan_json: &str,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        guard_transition(conn, document_id, DocumentStatus::SplitComplete)?;
        conn.execute(
            "UPDATE documents SET status = ?2, splitting_plan = ?3, updated_at = ?4
             WHERE document_id = ?1",
            params![
                document_id,
                DocumentStatus::SplitComplete.as_str(),
                plan_json,
                updated_at
            ],
        )?;
        Ok(())
    })
}

/// Persists extraction output and marks the child `EXTRACTION_COMPLETE`.
pub fn record_extraction(
    db: &Database,
    document_id: &str,
    extracted_data_json: &str,
    document_type: &str,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        guard_transition(conn, document_id, DocumentStatus::ExtractionComplete)?;
        conn.execute(
            "UPDATE documents SET status = ?2, extracted_data = ?3, document_type = ?4,
             updated_at = ?5 WHERE document_id = ?1",
            params![
                document_id,
                DocumentStatus::ExtractionComplete.as_str(),
                extracted_data_json,
                document_type,
                updated_at
            ],
        )?;
        Ok(())
    })
}

/// Marks a record `FAILED` with a cause. An optional diagnostic payload
/// (e.g. the raw model output) is retained in `extracted_data`. Writing to
/// an already-failed record is a no-op, so the pipeline boundary may report
/// a failure more than once without erroring.
pub fn record_failure(
    db: &Database,
    document_id: &str,
    cause: &str,
    diagnostic: Option<&str>,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let from = current_status(conn, document_id)?;
        if from == DocumentStatus::Failed {
            return Ok(());
        }
        match diagnostic {
            Some(raw) => {
                conn.execute(
                    "UPDATE documents SET status = ?2, error = ?3, extracted_data = ?4,
                     updated_at = ?5 WHERE document_id = ?1",
                    params![
                        document_id,
                        DocumentStatus::Failed.as_str(),
                        cause,
                        raw,
                        updated_at
                    ],
                )?;
            }
            None => {
                conn.execute(
                    "UPDATE documents SET status = ?2, error = ?3, updated_at = ?4
                     WHERE document_id = ?1",
                    params![document_id, DocumentStatus::Failed.as_str(), cause, updated_at],
                )?;
            }
        }
        Ok(())
    })
}
