//! Splitting-plan validation.
//!
//! Raw model output crosses a strict validate-then-act boundary here:
//! nothing downstream ever slices a document from anything but a
//! [`SplitPlan`] that passed [`validate`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::extract_embedded_json;

/// One named page range of a validated plan. Pages are inclusive and
/// 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSection {
    pub section_name: String,
    pub start_page: u32,
    pub end_page: u32,
    pub summary: String,
}

/// A validated splitting plan: sections ordered by `start_page`, ranges
/// valid and non-overlapping. Serializes under the `splitting_plan` field
/// the dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPlan {
    pub splitting_plan: Vec<PlanSection>,
}

impl SplitPlan {
    pub fn sections(&self) -> &[PlanSection] {
        &self.splitting_plan
    }
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("no JSON object or array in model output")]
    NoJson,

    #[error("malformed plan JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("plan JSON has no 'splitting_plan' sequence")]
    MissingPlanField,

    #[error("plan contains no sections")]
    Empty,

    #[error("section {index} has an empty name")]
    EmptyName { index: usize },

    #[error("section '{name}' has invalid page range {start}..{end}")]
    InvalidRange { name: String, start: u32, end: u32 },

    #[error("sections '{first}' and '{second}' overlap")]
    Overlap { first: String, second: String },
}

/// Parses and validates raw model output into a [`SplitPlan`].
///
/// Tolerates surrounding prose (first embedded JSON object/array wins) and
/// accepts either `{"splitting_plan": [...]}` or a bare top-level array of
/// entries. Missing or mistyped fields, zero or inverted page numbers
/// and overlapping ranges are all rejections.
pub fn validate(raw: &str) -> Result<SplitPlan, PlanError> {
    let json = extract_embedded_json(raw).ok_or(PlanError::NoJson)?;
    let value: serde_json::Value = serde_json::from_str(json)?;

    let entries = match value {
        arr @ serde_json::Value::Array(_) => arr,
        serde_json::Value::Object(mut map) => {
            map.remove("splitting_plan").ok_or(PlanError::MissingPlanField)?
        }
        _ => return Err(PlanError::MissingPlanField),
    };
    if !entries.is_array() {
        return Err(PlanError::MissingPlanField);
    }

    let mut sections: Vec<PlanSection> = serde_json::from_value(entries)?;
    if sections.is_empty() {
        return Err(PlanError::Empty);
    }

    for (index, section) in sections.iter().enumerate() {
        if section.section_name.trim().is_empty() {
            return Err(PlanError::EmptyName { index });
        }
        if section.start_page == 0 || section.start_page > section.end_page {
            return Err(PlanError::InvalidRange {
                name: section.section_name.clone(),
                start: section.start_page,
                end: section.end_page,
            });
        }
    }

    // The invariant requires sections ordered by start page; the model is
    // not trusted to order them, so normalize before the overlap check.
    sections.sort_by_key(|s| s.start_page);
    for pair in sections.windows(2) {
        if pair[1].start_page <= pair[0].end_page {
            return Err(PlanError::Overlap {
                first: pair[0].section_name.clone(),
                second: pair[1].section_name.clone(),
            });
        }
    }

    Ok(SplitPlan {
        splitting_plan: sections,
    })
}
