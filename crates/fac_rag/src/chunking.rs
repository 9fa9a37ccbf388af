use fac_core::config::ChunkingParams;
use fac_core::domain::Chunk;
use fac_core::error::AppError;

use crate::pdf::PageText;

/// Split extracted pages into overlapping fixed-size character windows.
///
/// Windows never cross a page boundary, so every chunk carries an
/// unambiguous page number. `params` are validated up front; an
/// `overlap >= size` configuration is rejected before any work.
pub fn chunk_pages(
    pages: &[PageText],
    source_path: &str,
    namespace: &str,
    params: ChunkingParams,
) -> Result<Vec<Chunk>, AppError> {
    params.validate()?;

    let mut out = Vec::new();
    for page in pages {
        for window in split_windows(&page.text, params.size, params.overlap) {
            out.push(Chunk {
                text: window,
                source_path: source_path.to_string(),
                page_number: page.page_number,
                namespace: namespace.to_string(),
            });
        }
    }
    Ok(out)
}

/// Overlapping windows of `size` characters, advancing by
/// `size - overlap` each step. Cuts fall on char boundaries.
fn split_windows(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_count = offsets.len();
    if char_count == 0 {
        return Vec::new();
    }

    let step = size - overlap;
    let mut out = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + size).min(char_count);
        let byte_start = offsets[start];
        let byte_end = if end == char_count {
            text.len()
        } else {
            offsets[end]
        };
        out.push(text[byte_start..byte_end].to_string());
        if end == char_count {
            break;
        }
        start += step;
    }
    out
}
