use std::collections::BTreeMap;
use std::time::Duration;

use fac_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::{FragmentMetadata, QueryMatch, VectorRecord, VectorStore};

/// Blocking client for a Pinecone-style data plane: namespace-scoped
/// upsert/delete/query plus index stats. One instance per index host.
#[derive(Debug, Clone)]
pub struct PineconeStore {
    host: String,
    api_key: String,
}

impl PineconeStore {
    pub fn new(host: &str, api_key: &str) -> Result<Self, AppError> {
        let host = host.trim_end_matches('/').to_string();
        if !host.starts_with("https://") && !host.starts_with("http://") {
            return Err(
                AppError::new("CONFIG_INVALID", "Vector store host must be an http(s) URL")
                    .with_details(format!("host={host}")),
            );
        }
        if api_key.trim().is_empty() {
            return Err(AppError::new(
                "CONFIG_MISSING",
                "Vector store API key is required",
            ));
        }
        Ok(Self {
            host,
            api_key: api_key.to_string(),
        })
    }

    fn post(
        &self,
        path: &str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> Result<ureq::Response, AppError> {
        let url = format!("{}{}", self.host, path);
        let resp = ureq::post(&url)
            .set("Api-Key", &self.api_key)
            .timeout(timeout)
            .send_json(body);

        match resp {
            Ok(r) => Ok(r),
            Err(ureq::Error::Status(status, _)) => Err(AppError::new(
                "VECTOR_STORE_FAILED",
                "Vector store request was rejected",
            )
            .with_details(format!("path={path}; status={status}"))),
            Err(e) => Err(
                AppError::new("VECTOR_STORE_FAILED", "Failed to reach vector store")
                    .with_details(format!("path={path}; err={e}"))
                    .with_retryable(true),
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAllRequest<'a> {
    delete_all: bool,
    namespace: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    namespace: &'a str,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize)]
struct WireMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<FragmentMetadata>,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    namespaces: BTreeMap<String, NamespaceStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: u64,
}

impl VectorStore for PineconeStore {
    fn upsert(&self, namespace: &str, records: &[VectorRecord]) -> Result<(), AppError> {
        let body = serde_json::to_value(UpsertRequest {
            vectors: records,
            namespace,
        })
        .map_err(|e| {
            AppError::new("VECTOR_STORE_FAILED", "Failed to encode upsert request")
                .with_details(e.to_string())
        })?;
        self.post("/vectors/upsert", body, Duration::from_secs(30))?;
        Ok(())
    }

    fn delete_all(&self, namespace: &str) -> Result<(), AppError> {
        let body = serde_json::to_value(DeleteAllRequest {
            delete_all: true,
            namespace,
        })
        .map_err(|e| {
            AppError::new("VECTOR_STORE_FAILED", "Failed to encode delete request")
                .with_details(e.to_string())
        })?;
        self.post("/vectors/delete", body, Duration::from_secs(10))?;
        Ok(())
    }

    fn query(
        &self,
        namespace: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<QueryMatch>, AppError> {
        let body = serde_json::to_value(QueryRequest {
            vector: embedding,
            top_k: k,
            namespace,
            include_metadata: true,
        })
        .map_err(|e| {
            AppError::new("VECTOR_STORE_FAILED", "Failed to encode query request")
                .with_details(e.to_string())
        })?;
        let resp = self.post("/query", body, Duration::from_secs(10))?;
        let parsed: QueryResponse = resp.into_json().map_err(|e| {
            AppError::new("VECTOR_STORE_FAILED", "Failed to decode query response")
                .with_details(e.to_string())
        })?;

        // Matches without metadata cannot be cited; drop them.
        Ok(parsed
            .matches
            .into_iter()
            .filter_map(|m| {
                m.metadata.map(|metadata| QueryMatch {
                    id: m.id,
                    score: m.score,
                    metadata,
                })
            })
            .collect())
    }

    fn stats(&self) -> Result<BTreeMap<String, u64>, AppError> {
        let resp = self.post(
            "/describe_index_stats",
            serde_json::json!({}),
            Duration::from_secs(10),
        )?;
        let parsed: StatsResponse = resp.into_json().map_err(|e| {
            AppError::new("VECTOR_STORE_FAILED", "Failed to decode stats response")
                .with_details(e.to_string())
        })?;
        Ok(parsed
            .namespaces
            .into_iter()
            .map(|(ns, st)| (ns, st.vector_count))
            .collect())
    }
}
