//! Prompt builders for the two model call sites.

/// Character budget for document text included in a prompt. Recognized text
/// from large scans can run far past any useful context window.
pub const MAX_PROMPT_TEXT_CHARS: usize = 8000;

fn truncated(text: &str) -> String {
    text.chars().take(MAX_PROMPT_TEXT_CHARS).collect()
}

/// Prompt asking the model to propose a splitting plan for a multi-section
/// document.
pub fn split_plan_prompt(document_text: &str) -> String {
    format!(
        r#"You are a document analysis assistant. The text below was recognized
page by page from a scanned multi-section document. Identify the distinct
sections and the 1-based page range each one covers.
Respond ONLY with valid JSON. Do not include any other text.

RULES:
- Every page belongs to exactly one section; ranges must not overlap
- start_page and end_page are inclusive 1-based page numbers
- section_name is a short human-readable title
- summary is one sentence describing the section's content

Return JSON:
{{"splitting_plan": [
  {{"section_name": "Lab Results", "start_page": 1, "end_page": 2, "summary": "Blood panel results"}}
]}}

Document text:
{text}"#,
        text = truncated(document_text),
    )
}

/// Prompt asking the model to classify one section and extract its fields.
pub fn section_extraction_prompt(section_text: &str) -> String {
    format!(
        r#"You are a document data-entry assistant. The text below was recognized
from a single section of a medical document. Classify the section and
extract its key data points.
Respond ONLY with valid JSON. Do not include any other text.

RULES:
- document_type is a short PascalCase label (e.g. "LabReport", "Referral", "Invoice")
- fields is a flat mapping of descriptive field names to the extracted values
- Omit fields you cannot find; do not invent values

Return JSON:
{{"document_type": "LabReport", "fields": {{"patient_name": "Jane Doe", "collection_date": "2026-01-12"}}}}

Section text:
{text}"#,
        text = truncated(section_text),
    )
}
