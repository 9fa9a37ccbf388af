use std::collections::BTreeMap;
use std::sync::Mutex;

use fac_core::error::AppError;

use super::{QueryMatch, VectorRecord, VectorStore};

/// In-process vector store with exact cosine ranking. Backs the tests
/// and local runs; semantics mirror the hosted store: upsert replaces
/// by id, delete on a missing namespace errors, short result lists are
/// fine.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: Mutex<BTreeMap<String, Vec<VectorRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<VectorRecord>>>, AppError> {
        self.namespaces.lock().map_err(|_| {
            AppError::new("VECTOR_STORE_FAILED", "In-memory store lock poisoned")
        })
    }
}

impl VectorStore for MemoryStore {
    fn upsert(&self, namespace: &str, records: &[VectorRecord]) -> Result<(), AppError> {
        let mut namespaces = self.lock()?;
        let existing = namespaces.entry(namespace.to_string()).or_default();
        existing.retain(|r| !records.iter().any(|n| n.id == r.id));
        existing.extend_from_slice(records);
        Ok(())
    }

    fn delete_all(&self, namespace: &str) -> Result<(), AppError> {
        let mut namespaces = self.lock()?;
        if namespaces.remove(namespace).is_none() {
            return Err(
                AppError::new("VECTOR_STORE_FAILED", "Namespace not found")
                    .with_details(format!("namespace={namespace}")),
            );
        }
        Ok(())
    }

    fn query(
        &self,
        namespace: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<QueryMatch>, AppError> {
        let namespaces = self.lock()?;
        let records = match namespaces.get(namespace) {
            Some(r) => r,
            None => return Ok(Vec::new()),
        };

        let query_norm = l2_norm(embedding);
        if query_norm == 0.0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<QueryMatch> = Vec::new();
        for record in records {
            let record_norm = l2_norm(&record.values);
            if record_norm == 0.0 || record.values.len() != embedding.len() {
                continue;
            }
            let score = cosine_similarity(embedding, &record.values, query_norm, record_norm);
            hits.push(QueryMatch {
                id: record.id.clone(),
                score,
                metadata: record.metadata.clone(),
            });
        }

        // Deterministic ordering: score desc, then id asc as tie-breaker.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);
        Ok(hits)
    }

    fn stats(&self) -> Result<BTreeMap<String, u64>, AppError> {
        let namespaces = self.lock()?;
        Ok(namespaces
            .iter()
            .map(|(ns, records)| (ns.clone(), records.len() as u64))
            .collect())
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine_similarity(a: &[f32], b: &[f32], a_norm: f32, b_norm: f32) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}
