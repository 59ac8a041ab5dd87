//! Physical document splitting.
//!
//! Takes source PDF bytes plus a validated plan and assembles one
//! standalone artifact per section. Every section is staged in memory
//! before anything is persisted, so a bad page range fails the whole split
//! with no partial child set.

use thiserror::Error;

use crate::plan::SplitPlan;
use crate::storage::{DERIVED_PREFIX, UPLOAD_PREFIX};

/// One assembled section artifact, not yet persisted.
#[derive(Debug, Clone)]
pub struct ChildArtifact {
    /// Derived-namespace storage key.
    pub key: String,
    /// 1-based section index within the plan.
    pub index: usize,
    pub section_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Failed to load source PDF: {0}")]
    Load(String),

    #[error("Section '{name}' spans pages {start}..{end} but the document has {page_count}")]
    PageOutOfRange {
        name: String,
        start: u32,
        end: u32,
        page_count: u32,
    },

    #[error("Failed to assemble section '{name}': {reason}")]
    Assemble { name: String, reason: String },
}

/// Derived-namespace key for a section artifact. Deterministic in the
/// parent key and section index, so re-splitting the same parent
/// overwrites instead of duplicating.
pub fn child_key(parent_key: &str, index: usize) -> String {
    let name = parent_key.strip_prefix(UPLOAD_PREFIX).unwrap_or(parent_key);
    format!("{}{}/section_{}.pdf", DERIVED_PREFIX, name, index)
}

/// Assembles one artifact per plan section, all in memory.
pub fn split_document(
    parent_key: &str,
    bytes: &[u8],
    plan: &SplitPlan,
) -> Result<Vec<ChildArtifact>, SplitError> {
    let _span = tracing::info_span!("split_document", parent = parent_key).entered();

    let source = lopdf::Document::load_mem(bytes).map_err(|e| SplitError::Load(e.to_string()))?;
    let page_count = source.get_pages().len() as u32;

    // Range check everything before assembling anything.
    for section in plan.sections() {
        if section.end_page > page_count {
            return Err(SplitError::PageOutOfRange {
                name: section.section_name.clone(),
                start: section.start_page,
                end: section.end_page,
                page_count,
            });
        }
    }

    let mut artifacts = Vec::with_capacity(plan.sections().len());
    for (i, section) in plan.sections().iter().enumerate() {
        let index = i + 1;
        let discard: Vec<u32> = (1..=page_count)
            .filter(|p| *p < section.start_page || *p > section.end_page)
            .collect();

        let mut child = source.clone();
        if !discard.is_empty() {
            child.delete_pages(&discard);
        }
        child.prune_objects();
        child.renumber_objects();

        let mut out = Vec::new();
        child.save_to(&mut out).map_err(|e| SplitError::Assemble {
            name: section.section_name.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            section = %section.section_name,
            start = section.start_page,
            end = section.end_page,
            size = out.len(),
            "assembled section artifact"
        );

        artifacts.push(ChildArtifact {
            key: child_key(parent_key, index),
            index,
            section_name: section.section_name.clone(),
            bytes: out,
        });
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanSection, SplitPlan};
    use crate::testutil::pdf_with_pages;

    fn plan(sections: &[(&str, u32, u32)]) -> SplitPlan {
        SplitPlan {
            splitting_plan: sections
                .iter()
                .map(|(name, start, end)| PlanSection {
                    section_name: name.to_string(),
                    start_page: *start,
                    end_page: *end,
                    summary: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_child_key_is_deterministic_and_derived() {
        let key = child_key("uploads/report.pdf", 1);
        assert_eq!(key, "split/report.pdf/section_1.pdf");
        assert_eq!(key, child_key("uploads/report.pdf", 1));
        assert!(crate::storage::is_derived_key(&key));
        assert!(!crate::storage::is_upload_key(&key));
    }

    #[test]
    fn test_split_three_pages_into_two_sections() {
        let bytes = pdf_with_pages(&["Cover text", "Body first", "Body second"]);
        let artifacts =
            split_document("uploads/report.pdf", &bytes, &plan(&[("Cover", 1, 1), ("Body", 2, 3)]))
                .unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].key, "split/report.pdf/section_1.pdf");
        assert_eq!(artifacts[1].key, "split/report.pdf/section_2.pdf");

        let cover = lopdf::Document::load_mem(&artifacts[0].bytes).unwrap();
        assert_eq!(cover.get_pages().len(), 1);
        let cover_text = cover.extract_text(&[1]).unwrap();
        assert!(cover_text.contains("Cover text"));

        let body = lopdf::Document::load_mem(&artifacts[1].bytes).unwrap();
        assert_eq!(body.get_pages().len(), 2);
        let body_text: String = body
            .get_pages()
            .keys()
            .map(|p| body.extract_text(&[*p]).unwrap_or_default())
            .collect();
        assert!(body_text.contains("Body first"));
        assert!(body_text.contains("Body second"));
        assert!(!body_text.contains("Cover text"));
    }

    #[test]
    fn test_single_section_covering_whole_document() {
        let bytes = pdf_with_pages(&["One", "Two"]);
        let artifacts =
            split_document("uploads/whole.pdf", &bytes, &plan(&[("All", 1, 2)])).unwrap();
        assert_eq!(artifacts.len(), 1);
        let doc = lopdf::Document::load_mem(&artifacts[0].bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_out_of_range_fails_whole_split() {
        let bytes = pdf_with_pages(&["One", "Two"]);
        let err = split_document(
            "uploads/short.pdf",
            &bytes,
            &plan(&[("Ok", 1, 1), ("TooFar", 2, 5)]),
        )
        .unwrap_err();
        assert!(matches!(err, SplitError::PageOutOfRange { page_count: 2, .. }));
    }

    #[test]
    fn test_invalid_source_fails() {
        let err = split_document("uploads/bad.pdf", b"not a pdf", &plan(&[("A", 1, 1)]))
            .unwrap_err();
        assert!(matches!(err, SplitError::Load(_)));
    }

    #[test]
    fn test_resplit_produces_same_keys() {
        let bytes = pdf_with_pages(&["One", "Two", "Three"]);
        let p = plan(&[("A", 1, 1), ("B", 2, 3)]);
        let first = split_document("uploads/r.pdf", &bytes, &p).unwrap();
        let second = split_document("uploads/r.pdf", &bytes, &p).unwrap();
        let first_keys: Vec<_> = first.iter().map(|a| a.key.clone()).collect();
        let second_keys: Vec<_> = second.iter().map(|a| a.key.clone()).collect();
        assert_eq!(first_keys, second_keys);
    }
}
