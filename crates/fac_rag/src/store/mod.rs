use std::collections::BTreeMap;

use fac_core::error::AppError;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod pinecone;

pub use memory::MemoryStore;
pub use pinecone::PineconeStore;

/// Metadata stored alongside every vector. `page` is optional so a
/// fragment whose source carried no page number round-trips as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FragmentMetadata {
    pub text: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: FragmentMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    pub metadata: FragmentMetadata,
}

/// Namespace-scoped vector store boundary. Each namespace isolates one
/// corpus (the reference coursebooks, or one patient's current notes).
pub trait VectorStore {
    /// Create-or-append: writes records into the namespace, replacing
    /// any record with the same id.
    fn upsert(&self, namespace: &str, records: &[VectorRecord]) -> Result<(), AppError>;

    /// Remove every vector in the namespace. Errors when the namespace
    /// does not exist; callers on the patient write path treat that as
    /// the benign first-upload case.
    fn delete_all(&self, namespace: &str) -> Result<(), AppError>;

    /// Top-k similarity search within one namespace. Returning fewer
    /// than `k` matches (including zero) is not an error.
    fn query(
        &self,
        namespace: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<QueryMatch>, AppError>;

    /// Per-namespace vector counts. Authoritative for "does this
    /// namespace already have content".
    fn stats(&self) -> Result<BTreeMap<String, u64>, AppError>;
}
