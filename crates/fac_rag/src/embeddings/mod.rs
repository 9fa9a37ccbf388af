use fac_core::error::AppError;

pub mod ollama_embed;

pub use ollama_embed::OllamaEmbedder;

/// Embedding boundary. Implementations must return the same
/// dimensionality for every call and L2-normalize their output, since
/// both the ingestion and query paths go through the same instance.
pub trait Embedder {
    fn embed(&self, input: &str) -> Result<Vec<f32>, AppError>;
}
