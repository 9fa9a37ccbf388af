use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Well-known namespace holding the shared reference coursebooks.
pub const DEFAULT_REFERENCE_NAMESPACE: &str = "Medical_Course";

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Character-window chunking parameters. `overlap` must stay strictly
/// below `size`; otherwise the window start would never advance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingParams {
    pub size: usize,
    pub overlap: usize,
}

impl ChunkingParams {
    pub fn new(size: usize, overlap: usize) -> Result<Self, AppError> {
        let params = Self { size, overlap };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.size == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Chunk size must be greater than zero",
            ));
        }
        if self.overlap >= self.size {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Chunk overlap must be strictly smaller than chunk size",
            )
            .with_details(format!("size={}; overlap={}", self.size, self.overlap)));
        }
        Ok(())
    }
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Resolved application configuration. Credentials come from the
/// environment; everything else ships a working default and can be
/// overridden per variable.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pinecone_api_key: String,
    pub pinecone_index_host: String,
    pub embed_base_url: String,
    pub embed_model: String,
    pub chat_base_url: String,
    pub chat_api_key: String,
    pub chat_model: String,
    pub reference_namespace: String,
    pub chunking: ChunkingParams,
    pub batch_size: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let chunking = ChunkingParams::new(
            env_usize("FAC_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            env_usize("FAC_CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
        )?;
        let batch_size = env_usize("FAC_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Ingestion batch size must be greater than zero",
            ));
        }

        Ok(Self {
            pinecone_api_key: require_env("PINECONE_API_KEY")?,
            pinecone_index_host: require_env("PINECONE_INDEX_HOST")?,
            embed_base_url: env_or("FAC_EMBED_BASE_URL", "http://127.0.0.1:11434"),
            embed_model: env_or("FAC_EMBED_MODEL", "nomic-embed-text"),
            chat_base_url: env_or("FAC_CHAT_BASE_URL", "https://openrouter.ai/api/v1"),
            chat_api_key: require_env("OPENROUTER_API_KEY")?,
            chat_model: env_or("FAC_CHAT_MODEL", "deepseek/deepseek-chat"),
            reference_namespace: env_or("FAC_REFERENCE_NAMESPACE", DEFAULT_REFERENCE_NAMESPACE),
            chunking,
            batch_size,
        })
    }
}

fn require_env(key: &str) -> Result<String, AppError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::new(
            "CONFIG_MISSING",
            "Required environment variable is missing",
        )
        .with_details(format!("var={key}"))),
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

fn env_usize(key: &str, default: usize) -> Result<usize, AppError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<usize>().map_err(|e| {
            AppError::new("CONFIG_INVALID", "Environment variable must be an integer")
                .with_details(format!("var={key}; value={v}; err={e}"))
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::ChunkingParams;
    use pretty_assertions::assert_eq;

    #[test]
    fn rejects_overlap_not_below_size() {
        assert!(ChunkingParams::new(1000, 200).is_ok());
        assert!(ChunkingParams::new(100, 100).is_err());
        assert!(ChunkingParams::new(100, 150).is_err());
        assert!(ChunkingParams::new(0, 0).is_err());
    }

    #[test]
    fn config_error_is_raised_before_any_io() {
        let err = ChunkingParams::new(10, 10).unwrap_err();
        assert_eq!(err.code, "CONFIG_INVALID");
    }
}
