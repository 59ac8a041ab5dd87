//! Per-page embedded-text extraction with lopdf.

use super::PageText;

/// Extracts the embedded text of every page, in page order.
///
/// Pages whose content cannot be decoded contribute an empty string rather
/// than failing the whole document; scanned PDFs routinely contain pages
/// with no text layer.
pub fn extract_page_texts(bytes: &[u8]) -> Result<Vec<PageText>, String> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| format!("failed to load PDF: {}", e))?;

    let mut pages = Vec::new();
    for (page_num, _) in doc.get_pages() {
        let text = doc.extract_text(&[page_num]).unwrap_or_default();
        pages.push(PageText {
            page: page_num,
            text,
        });
    }

    Ok(pages)
}
