use std::path::Path;

use fac_core::config::ChunkingParams;
use fac_core::domain::Chunk;
use fac_core::error::AppError;
use fac_core::ledger::IngestionLedger;
use log::{info, warn};
use sha2::{Digest, Sha256};

use crate::chunking::chunk_pages;
use crate::embeddings::Embedder;
use crate::pdf::PdfExtractor;
use crate::store::{FragmentMetadata, VectorRecord, VectorStore};

/// Outcome of a reference-coursebook ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceIngest {
    /// The file was already ingested; no extraction or upload happened.
    Skipped,
    Ingested {
        chunk_count: usize,
        /// Batches after the first that failed and were skipped.
        failed_batches: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientIngest {
    pub patient_id: String,
    pub chunk_count: usize,
}

/// Ingest a coursebook PDF into the shared reference namespace.
///
/// Deduplicated by filename: a ledger hit is confirmed against the
/// store's stats (the store is authoritative for contents; the ledger
/// is only a fast path) and a stale ledger entry over an empty
/// namespace triggers re-ingestion. Uploads go out in fixed-size
/// batches to bound request payloads. A first-batch failure aborts
/// with nothing marked ingested; later batch failures are logged and
/// skipped, and already-written chunks stay in place.
#[allow(clippy::too_many_arguments)]
pub fn ingest_reference(
    pdf_path: &Path,
    namespace: &str,
    ledger: &mut IngestionLedger,
    extractor: &dyn PdfExtractor,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    params: ChunkingParams,
    batch_size: usize,
) -> Result<ReferenceIngest, AppError> {
    params.validate()?;
    if batch_size == 0 {
        return Err(AppError::new(
            "CONFIG_INVALID",
            "Ingestion batch size must be greater than zero",
        ));
    }

    let filename = file_name_of(pdf_path)?;
    if ledger.contains(namespace, &filename) {
        let stats = store.stats()?;
        if stats.get(namespace).copied().unwrap_or(0) > 0 {
            info!("skipping {filename}: already ingested into {namespace}");
            return Ok(ReferenceIngest::Skipped);
        }
        warn!("ledger lists {filename} but namespace {namespace} is empty; re-ingesting");
        ledger.unmark(namespace, &filename)?;
    }

    let pages = extractor.extract(pdf_path)?;
    let chunks = chunk_pages(&pages, &pdf_path.display().to_string(), namespace, params)?;
    if chunks.is_empty() {
        return Err(
            AppError::new("INGESTION_EMPTY", "No chunks produced from PDF")
                .with_details(format!("file={filename}; namespace={namespace}")),
        );
    }

    let total_batches = (chunks.len() - 1) / batch_size + 1;
    let mut failed_batches = 0usize;
    for (batch_index, batch) in chunks.chunks(batch_size).enumerate() {
        let base_ordinal = batch_index * batch_size;
        match upsert_batch(store, embedder, namespace, batch, base_ordinal) {
            Ok(()) => {
                info!(
                    "uploaded batch {}/{total_batches} ({} chunks) to {namespace}",
                    batch_index + 1,
                    batch.len()
                );
            }
            Err(e) if batch_index == 0 => {
                // Atomicity boundary: nothing is marked ingested.
                return Err(AppError::new(
                    "INGESTION_FAILED",
                    "First ingestion batch failed; aborting",
                )
                .with_details(format!(
                    "namespace={namespace}; file={filename}; batch=0; cause={e}"
                )));
            }
            Err(e) => {
                warn!(
                    "batch {}/{total_batches} failed for {filename} in {namespace}: {e}; continuing",
                    batch_index + 1
                );
                failed_batches += 1;
            }
        }
    }

    ledger.mark(namespace, &filename)?;
    info!(
        "ingested {filename} into {namespace} ({} chunks, {failed_batches} failed batches)",
        chunks.len()
    );
    Ok(ReferenceIngest::Ingested {
        chunk_count: chunks.len(),
        failed_batches,
    })
}

/// Ingest (replace) a patient's PDF into its own namespace.
///
/// The patient id is the filename stem. Any existing namespace content
/// is deleted first; a delete failure is the benign first-upload case
/// and is never surfaced. The full chunk set then goes out in one
/// upsert, so an empty extraction leaves no partial namespace state.
pub fn ingest_patient(
    pdf_path: &Path,
    extractor: &dyn PdfExtractor,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    params: ChunkingParams,
) -> Result<PatientIngest, AppError> {
    params.validate()?;
    let patient_id = patient_id_from_path(pdf_path)?;

    let pages = extractor.extract(pdf_path)?;
    let chunks = chunk_pages(&pages, &pdf_path.display().to_string(), &patient_id, params)?;
    if chunks.is_empty() {
        return Err(
            AppError::new("INGESTION_EMPTY", "No chunks produced from patient PDF")
                .with_details(format!("patient={patient_id}")),
        );
    }

    if let Err(e) = store.delete_all(&patient_id) {
        info!("namespace {patient_id} not cleared (treating as first upload): {e}");
    }

    let records = embed_chunks(embedder, &chunks, 0)?;
    store.upsert(&patient_id, &records).map_err(|e| {
        AppError::new("INGESTION_FAILED", "Failed to upload patient chunks")
            .with_details(format!("namespace={patient_id}; cause={e}"))
            .with_retryable(e.retryable)
    })?;

    info!(
        "ingested patient PDF into {patient_id} ({} chunks)",
        chunks.len()
    );
    Ok(PatientIngest {
        patient_id,
        chunk_count: chunks.len(),
    })
}

pub fn file_name_of(path: &Path) -> Result<String, AppError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::new("INGESTION_FAILED", "Upload path has no usable filename")
                .with_details(format!("path={}", path.display()))
        })
}

/// Patient identifier derived deterministically from the filename stem.
pub fn patient_id_from_path(path: &Path) -> Result<String, AppError> {
    path.file_stem()
        .and_then(|n| n.to_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::new("INGESTION_FAILED", "Cannot derive patient id from filename")
                .with_details(format!("path={}", path.display()))
        })
}

fn upsert_batch(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    namespace: &str,
    batch: &[Chunk],
    base_ordinal: usize,
) -> Result<(), AppError> {
    let records = embed_chunks(embedder, batch, base_ordinal)?;
    store.upsert(namespace, &records)
}

fn embed_chunks(
    embedder: &dyn Embedder,
    chunks: &[Chunk],
    base_ordinal: usize,
) -> Result<Vec<VectorRecord>, AppError> {
    let mut records = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let values = embedder.embed(&chunk.text)?;
        records.push(VectorRecord {
            id: vector_id(chunk, base_ordinal + i),
            values,
            metadata: FragmentMetadata {
                text: chunk.text.clone(),
                source: chunk.source_path.clone(),
                page: Some(chunk.page_number),
            },
        });
    }
    Ok(records)
}

/// Deterministic id from the chunk's coordinates, so re-ingesting the
/// same content overwrites instead of duplicating.
fn vector_id(chunk: &Chunk, ordinal: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(chunk.namespace.as_bytes());
    hasher.update(b"|");
    hasher.update(chunk.source_path.as_bytes());
    hasher.update(b"|");
    hasher.update(chunk.page_number.to_le_bytes());
    hasher.update(b"|");
    hasher.update((ordinal as u64).to_le_bytes());
    hex::encode(hasher.finalize())[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn patient_id_is_the_filename_stem() {
        let id = patient_id_from_path(Path::new("data/patient_data/john_doe.pdf")).expect("id");
        assert_eq!(id, "john_doe");
        assert!(patient_id_from_path(Path::new("/")).is_err());
    }

    #[test]
    fn vector_ids_are_deterministic() {
        let chunk = Chunk {
            text: "apply pressure".to_string(),
            source_path: "book.pdf".to_string(),
            page_number: 3,
            namespace: "Medical_Course".to_string(),
        };
        assert_eq!(vector_id(&chunk, 7), vector_id(&chunk, 7));
        assert_ne!(vector_id(&chunk, 7), vector_id(&chunk, 8));
    }
}
