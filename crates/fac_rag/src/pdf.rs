use std::path::Path;

use fac_core::error::AppError;

/// Extracted text for one page, 1-based. Pages yielding no
/// non-whitespace text are never emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// Capability boundary for PDF text extraction: a page-indexed text
/// sequence in natural reading order. Tests substitute fixed-page
/// implementations; production uses [`LopdfExtractor`].
pub trait PdfExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<PageText>, AppError>;
}

/// Production extractor over `lopdf`. Reading-order restoration within
/// a page is the library's concern; pages that fail text decoding
/// (image-only or malformed content streams) are skipped rather than
/// failing the whole document.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<PageText>, AppError> {
        let doc = lopdf::Document::load(path).map_err(|e| {
            AppError::new("EXTRACTION_FAILED", "Failed to open PDF")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            let text = match doc.extract_text(&[*page_number]) {
                Ok(t) => t,
                Err(_) => continue,
            };
            if text.trim().is_empty() {
                continue;
            }
            pages.push(PageText {
                page_number: *page_number,
                text,
            });
        }

        if pages.is_empty() {
            return Err(
                AppError::new("EXTRACTION_EMPTY", "PDF contains no extractable text")
                    .with_details(format!("path={}", path.display())),
            );
        }
        Ok(pages)
    }
}
