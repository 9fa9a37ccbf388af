use serde::{Deserialize, Serialize};

/// A bounded, page-tagged span of extracted text. The unit of embedding
/// and retrieval; immutable once produced by the chunker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub source_path: String,
    /// 1-based page number in the source PDF.
    pub page_number: u32,
    pub namespace: String,
}

/// Citation metadata for one retrieved fragment, in retrieval order.
/// An exact copy of the fragment's stored metadata; a fragment whose
/// vector carried no page number is cited without one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    pub source_path: String,
    pub page_number: Option<u32>,
    pub namespace: String,
    pub fragment_text: String,
}
