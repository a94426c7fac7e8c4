//! PDF text extraction with page provenance

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Document;

/// Loads a PDF into a page-segmented [`Document`]
pub struct PdfLoader;

impl PdfLoader {
    /// Extract per-page text from the PDF at `path`.
    ///
    /// The source label is what citations display; page numbers are 1-based
    /// in extraction order.
    pub fn load(path: &Path, source_label: &str) -> Result<Document> {
        let data = std::fs::read(path)
            .map_err(|e| Error::document(path.display().to_string(), e.to_string()))?;

        Self::load_bytes(&data, path, source_label)
    }

    fn load_bytes(data: &[u8], path: &Path, source_label: &str) -> Result<Document> {
        let page_texts = pdf_extract::extract_text_from_mem_by_pages(data)
            .map_err(|e| Error::document(path.display().to_string(), e.to_string()))?;

        if page_texts.is_empty() || page_texts.iter().all(|p| p.trim().is_empty()) {
            return Err(Error::document(
                path.display().to_string(),
                "no text extracted from PDF",
            ));
        }

        // Cross-check the page count against the document catalog; extraction
        // occasionally drops empty pages, which only shifts provenance.
        if let Ok(doc) = lopdf::Document::load_mem(data) {
            let catalog_pages = doc.get_pages().len();
            if catalog_pages != page_texts.len() {
                tracing::warn!(
                    extracted = page_texts.len(),
                    catalog = catalog_pages,
                    "extracted page count differs from PDF catalog"
                );
            }
        }

        let document = Document::from_pages(source_label, page_texts);
        tracing::info!(
            source = %document.source,
            pages = document.page_count(),
            "loaded PDF"
        );

        Ok(document)
    }
}
