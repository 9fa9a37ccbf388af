use std::collections::BTreeMap;

use fac_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::store::VectorStore;

/// Rank constant for reciprocal-rank fusion; the conventional value
/// used by ensemble retrievers.
const RRF_RANK_CONSTANT: f32 = 60.0;

/// One retrieved fragment with its stored metadata, most relevant
/// first. The score is a raw cosine similarity for single-namespace
/// retrieval and a fused rank score for composite retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedFragment {
    pub text: String,
    pub source_path: String,
    pub page_number: Option<u32>,
    pub namespace: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct RetrieverArm {
    namespace: String,
    k: usize,
    weight: f32,
}

/// Read-only retrieval plan: one or two weighted namespace arms.
/// Constructed fresh per query; holds no store or embedder handles.
#[derive(Debug, Clone, PartialEq)]
pub struct Retriever {
    arms: Vec<RetrieverArm>,
}

/// Search modes mirroring the front end's selector, with the weights
/// and result-count presets each mode uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Reference and patient corpora, weighted 0.6/0.4.
    Everywhere,
    ReferenceOnly,
    PatientOnly,
}

/// Build a retriever over the active namespaces.
///
/// At least one namespace must be given. When both are present the
/// merged ranking favors the higher-weighted namespace; an unused arm's
/// `k` must still be strictly positive (safe default, ignored when the
/// arm's weight is zero).
pub fn build_retriever(
    reference_namespace: Option<&str>,
    patient_namespace: Option<&str>,
    k_reference: usize,
    k_patient: usize,
    weights: (f32, f32),
) -> Result<Retriever, AppError> {
    if k_reference == 0 || k_patient == 0 {
        return Err(AppError::new(
            "RETRIEVAL_INVALID",
            "Retriever result counts must be strictly positive",
        )
        .with_details(format!("k_reference={k_reference}; k_patient={k_patient}")));
    }
    if weights.0 < 0.0 || weights.1 < 0.0 {
        return Err(AppError::new(
            "RETRIEVAL_INVALID",
            "Retriever weights must be non-negative",
        )
        .with_details(format!("weights=({}, {})", weights.0, weights.1)));
    }

    let arms = match (reference_namespace, patient_namespace) {
        (None, None) => {
            return Err(AppError::new(
                "RETRIEVAL_INVALID",
                "At least one namespace is required to build a retriever",
            ))
        }
        (Some(reference), None) => vec![RetrieverArm {
            namespace: reference.to_string(),
            k: k_reference,
            weight: 1.0,
        }],
        (None, Some(patient)) => vec![RetrieverArm {
            namespace: patient.to_string(),
            k: k_patient,
            weight: 1.0,
        }],
        (Some(reference), Some(patient)) => vec![
            RetrieverArm {
                namespace: reference.to_string(),
                k: k_reference,
                weight: weights.0,
            },
            RetrieverArm {
                namespace: patient.to_string(),
                k: k_patient,
                weight: weights.1,
            },
        ],
    };
    Ok(Retriever { arms })
}

/// Convenience constructor applying the per-mode weight and k presets.
pub fn build_retriever_for_mode(
    mode: SearchMode,
    reference_namespace: &str,
    patient_id: Option<&str>,
) -> Result<Retriever, AppError> {
    match mode {
        SearchMode::Everywhere => {
            build_retriever(Some(reference_namespace), patient_id, 4, 4, (0.6, 0.4))
        }
        SearchMode::ReferenceOnly => {
            build_retriever(Some(reference_namespace), None, 6, 4, (1.0, 0.0))
        }
        SearchMode::PatientOnly => {
            let patient = patient_id.ok_or_else(|| {
                AppError::new(
                    "RETRIEVAL_INVALID",
                    "Patient-only mode requires an active patient",
                )
            })?;
            build_retriever(Some(reference_namespace), Some(patient), 4, 5, (0.0, 1.0))
        }
    }
}

impl Retriever {
    /// Embed the question once and query each active arm. A namespace
    /// returning fewer than `k` hits, including zero, is not an error.
    pub fn retrieve(
        &self,
        store: &dyn VectorStore,
        embedder: &dyn Embedder,
        question: &str,
    ) -> Result<Vec<RetrievedFragment>, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::new(
                "RETRIEVAL_INVALID",
                "Question must not be empty",
            ));
        }

        let query_vector = embedder.embed(question)?;

        let mut ranked_lists = Vec::new();
        for arm in &self.arms {
            if arm.weight <= 0.0 {
                continue;
            }
            let matches = store
                .query(&arm.namespace, &query_vector, arm.k)
                .map_err(|e| {
                    AppError::new("RETRIEVAL_FAILED", "Vector store query failed")
                        .with_details(format!("namespace={}; cause={e}", arm.namespace))
                        .with_retryable(e.retryable)
                })?;
            ranked_lists.push((arm, matches));
        }

        if ranked_lists.len() == 1 {
            let (arm, matches) = ranked_lists.remove(0);
            return Ok(matches
                .into_iter()
                .map(|m| RetrievedFragment {
                    text: m.metadata.text,
                    source_path: m.metadata.source,
                    page_number: m.metadata.page,
                    namespace: arm.namespace.clone(),
                    score: m.score,
                })
                .collect());
        }

        Ok(fuse_ranked_lists(ranked_lists))
    }
}

/// Weighted reciprocal-rank fusion over per-namespace ranked lists.
/// Record ids are namespace-qualified upstream, so no cross-namespace
/// collisions are possible.
fn fuse_ranked_lists(
    ranked_lists: Vec<(&RetrieverArm, Vec<crate::store::QueryMatch>)>,
) -> Vec<RetrievedFragment> {
    let mut fused: BTreeMap<String, (f32, RetrievedFragment)> = BTreeMap::new();
    for (arm, matches) in ranked_lists {
        for (rank, m) in matches.into_iter().enumerate() {
            let contribution = arm.weight / (rank as f32 + 1.0 + RRF_RANK_CONSTANT);
            let entry = fused.entry(m.id).or_insert_with(|| {
                (
                    0.0,
                    RetrievedFragment {
                        text: m.metadata.text,
                        source_path: m.metadata.source,
                        page_number: m.metadata.page,
                        namespace: arm.namespace.clone(),
                        score: 0.0,
                    },
                )
            });
            entry.0 += contribution;
        }
    }

    let mut out: Vec<(String, f32, RetrievedFragment)> = fused
        .into_iter()
        .map(|(id, (score, mut fragment))| {
            fragment.score = score;
            (id, score, fragment)
        })
        .collect();
    out.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    out.into_iter().map(|(_, _, fragment)| fragment).collect()
}
