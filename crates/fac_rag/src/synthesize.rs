use fac_core::domain::Citation;
use fac_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::llm::ChatModel;
use crate::prompts::{grounded_answer_prompt, INSUFFICIENT_CONTEXT_STATEMENT};
use crate::retrieve::{RetrievedFragment, Retriever};
use crate::store::VectorStore;

/// A grounded answer: model text, one citation per retrieved fragment
/// in retrieval order, and the raw fragments for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroundedAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub fragments: Vec<RetrievedFragment>,
}

/// Retrieve context for the question and produce a grounded answer in
/// a single model call.
///
/// Zero retrieved fragments short-circuit to the fixed insufficiency
/// statement without invoking the model; a model-call failure surfaces
/// as `SYNTHESIS_FAILED` with no partial answer.
pub fn synthesize(
    question: &str,
    retriever: &Retriever,
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    chat: &dyn ChatModel,
) -> Result<GroundedAnswer, AppError> {
    let fragments = retriever.retrieve(store, embedder, question)?;
    if fragments.is_empty() {
        return Ok(GroundedAnswer {
            answer: INSUFFICIENT_CONTEXT_STATEMENT.to_string(),
            citations: Vec::new(),
            fragments,
        });
    }

    let context_blocks = build_context_blocks(&fragments);
    let prompt = grounded_answer_prompt(question, &context_blocks);
    let answer = chat.complete(&prompt).map_err(|e| {
        AppError::new("SYNTHESIS_FAILED", "Model call failed")
            .with_details(e.to_string())
            .with_retryable(e.retryable)
    })?;

    let citations = fragments.iter().map(citation_for_fragment).collect();
    Ok(GroundedAnswer {
        answer,
        citations,
        fragments,
    })
}

fn build_context_blocks(fragments: &[RetrievedFragment]) -> String {
    fragments
        .iter()
        .map(|f| {
            let page = f
                .page_number
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                "[source={} page={page} namespace={}]\n{}",
                f.source_path, f.namespace, f.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Exact-field mapping from stored metadata, not a similarity match.
fn citation_for_fragment(fragment: &RetrievedFragment) -> Citation {
    Citation {
        source_path: fragment.source_path.clone(),
        page_number: fragment.page_number,
        namespace: fragment.namespace.clone(),
        fragment_text: fragment.text.clone(),
    }
}
