use fac_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::Embedder;

/// Embedder over a local Ollama server's `/api/embeddings` endpoint.
/// Output vectors are L2-normalized before being returned.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Embedding base URL must be an http(s) URL",
            )
            .with_details(format!("base_url={base_url}")));
        }
        if model.trim().is_empty() {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Embedding model name is required",
            ));
        }
        Ok(Self {
            base_url,
            model: model.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, input: &str) -> Result<Vec<f32>, AppError> {
        // Chunking keeps inputs bounded, but guard the payload anyway.
        let prompt = truncate_chars(input, 12_000);

        let url = format!("{}/api/embeddings", self.base_url);
        let req = EmbeddingsRequest {
            model: &self.model,
            prompt,
        };
        let resp = ureq::post(&url)
            .timeout(std::time::Duration::from_secs(10))
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("EMBEDDINGS_FAILED", "Failed to encode embeddings request")
                    .with_details(e.to_string())
            })?);

        let r = match resp {
            Ok(r) => r,
            Err(ureq::Error::Status(status, _)) => {
                return Err(
                    AppError::new("EMBEDDINGS_FAILED", "Embeddings request was rejected")
                        .with_details(format!("status={status}")),
                )
            }
            Err(e) => {
                return Err(
                    AppError::new("EMBEDDINGS_FAILED", "Failed to call embeddings endpoint")
                        .with_details(e.to_string())
                        .with_retryable(true),
                )
            }
        };

        let v: EmbeddingsResponse = r.into_json().map_err(|e| {
            AppError::new("EMBEDDINGS_FAILED", "Failed to decode embeddings response")
                .with_details(e.to_string())
        })?;
        if v.embedding.is_empty() {
            return Err(AppError::new(
                "EMBEDDINGS_FAILED",
                "Embeddings response was empty",
            ));
        }
        normalize(v.embedding)
    }
}

fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &input[..byte_idx],
        None => input,
    }
}

fn normalize(mut v: Vec<f32>) -> Result<Vec<f32>, AppError> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return Err(AppError::new(
            "EMBEDDINGS_FAILED",
            "Embedding norm is zero; cannot normalize",
        ));
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    Ok(v)
}
