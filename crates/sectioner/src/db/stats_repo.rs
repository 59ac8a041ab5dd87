//! Aggregate statistics over the documents table, computed by scanning.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Database, DatabaseError};

/// Store-wide aggregates backing the reports view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_uploads: u64,
    pub total_sections: u64,
    pub type_distribution: BTreeMap<String, u64>,
}

/// Collects aggregate counts: uploads (parent rows), sections (child rows)
/// and the distribution of classified section types.
pub fn collect(db: &Database) -> Result<StoreStats, DatabaseError> {
    db.with_conn(|conn| {
        let total_uploads: u64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE parent_document_id IS NULL",
            [],
            |r| r.get(0),
        )?;
        let total_sections: u64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE parent_document_id IS NOT NULL",
            [],
            |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT document_type, COUNT(*) FROM documents
             WHERE parent_document_id IS NOT NULL AND document_type IS NOT NULL
             GROUP BY document_type",
        )?;
        let mut type_distribution = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            let ty: String = row.get(0)?;
            let count: u64 = row.get(1)?;
            Ok((ty, count))
        })?;
        for row in rows {
            let (ty, count) = row?;
            type_distribution.insert(ty, count);
        }

        Ok(StoreStats {
            total_uploads,
            total_sections,
            type_distribution,
        })
    })
}
