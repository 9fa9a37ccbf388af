use fac_core::error::AppError;
use log::warn;
use serde::{Deserialize, Serialize};

use super::ChatModel;

const MAX_ATTEMPTS: u32 = 2;

/// Chat client for any OpenAI-compatible `/chat/completions` endpoint
/// (OpenRouter included, via the base URL). Transport failures are
/// retried at most once; HTTP rejections are not.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiChat {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(
                AppError::new("CONFIG_INVALID", "Chat base URL must be an http(s) URL")
                    .with_details(format!("base_url={base_url}")),
            );
        }
        if api_key.trim().is_empty() {
            return Err(AppError::new("CONFIG_MISSING", "Chat API key is required"));
        }
        if model.trim().is_empty() {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Chat model name is required",
            ));
        }
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature: 0.2,
        })
    }

    fn try_complete(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let req = ChatRequest {
            model: &self.model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let resp = ureq::post(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .timeout(std::time::Duration::from_secs(60))
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("CHAT_FAILED", "Failed to encode chat request")
                    .with_details(e.to_string())
            })?);

        let r = match resp {
            Ok(r) => r,
            Err(ureq::Error::Status(status, _)) => {
                return Err(
                    AppError::new("CHAT_FAILED", "Chat request was rejected")
                        .with_details(format!("status={status}")),
                )
            }
            Err(e) => {
                return Err(
                    AppError::new("CHAT_FAILED", "Failed to call chat endpoint")
                        .with_details(e.to_string())
                        .with_retryable(true),
                )
            }
        };

        let v: ChatResponse = r.into_json().map_err(|e| {
            AppError::new("CHAT_FAILED", "Failed to decode chat response")
                .with_details(e.to_string())
        })?;
        let content = v
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(AppError::new("CHAT_FAILED", "Chat response was empty"));
        }
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

impl ChatModel for OpenAiChat {
    fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let mut last_err = AppError::new("CHAT_FAILED", "Chat request failed");
        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_complete(prompt) {
                Ok(text) => return Ok(text),
                Err(e) if e.retryable && attempt < MAX_ATTEMPTS => {
                    warn!("chat attempt {attempt}/{MAX_ATTEMPTS} failed: {e}; retrying");
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err)
    }
}
