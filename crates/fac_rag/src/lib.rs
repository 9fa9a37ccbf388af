pub mod chunking;
pub mod embeddings;
pub mod ingest;
pub mod llm;
pub mod pdf;
pub mod prompts;
pub mod retrieve;
pub mod store;
pub mod synthesize;

#[cfg(test)]
mod tests {
    use super::prompts::{grounded_answer_prompt, INSUFFICIENT_CONTEXT_STATEMENT};

    #[test]
    fn prompt_carries_the_grounding_contract() {
        let prompt = grounded_answer_prompt("How do I stop bleeding?", "[context]");
        assert!(prompt.contains("ONLY the information provided in the context"));
        assert!(prompt.contains(INSUFFICIENT_CONTEXT_STATEMENT));
        assert!(prompt.contains("How do I stop bleeding?"));
        assert!(prompt.contains("[context]"));
    }
}
