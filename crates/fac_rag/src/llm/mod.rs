use fac_core::error::AppError;

pub mod openai_chat;

pub use openai_chat::OpenAiChat;

/// Chat-completion boundary: one stateless, single-turn call. Any
/// transient-retry policy lives inside the implementation and is
/// bounded.
pub trait ChatModel {
    fn complete(&self, prompt: &str) -> Result<String, AppError>;
}
