//! Google Generative Language (`generateContent`) provider.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    truncate_for_error, Completion, CompletionRequest, LlmError, LlmProvider, ModelName,
    ERROR_BODY_LIMIT,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Finish reasons that mean the model withheld its answer on policy grounds.
const REFUSAL_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: ModelName,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout.max(Duration::from_millis(1)))
            .build()
            .map_err(|error| LlmError::Transport {
                message: format!("failed to build http client: {error}"),
            })?;

        Ok(Self { client, config })
    }

    fn generate_content_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        if base.contains(":generateContent") {
            return base.replace("{model}", self.config.model.as_str());
        }
        format!("{base}/models/{}:generateContent", self.config.model)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn model(&self) -> &ModelName {
        &self.config.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let body = build_generate_content_body(&request);
        let response = self
            .client
            .post(self.generate_content_url())
            .query(&[("key", self.config.api_key.trim())])
            .json(&body)
            .send()
            .await
            .map_err(|error| LlmError::Transport {
                message: error.without_url().to_string(),
            })?;

        let status = response.status();
        let raw = response.text().await.map_err(|error| LlmError::Transport {
            message: error.without_url().to_string(),
        })?;
        debug!(status = status.as_u16(), bytes = raw.len(), "gemini response");

        if !status.is_success() {
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body: truncate_for_error(&raw, ERROR_BODY_LIMIT),
            });
        }

        parse_generate_content_response(&raw)
    }
}

fn build_generate_content_body(request: &CompletionRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }]
        }]
    })
}

fn parse_generate_content_response(raw: &str) -> Result<Completion, LlmError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(raw).map_err(|error| LlmError::InvalidResponse {
            message: error.to_string(),
        })?;

    if let Some(reason) = parsed
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(LlmError::Blocked { reason });
    }

    let candidate = parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or_else(|| LlmError::InvalidResponse {
            message: "response contained no candidates".to_string(),
        })?;

    let text = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect::<String>();

    if text.trim().is_empty() {
        if let Some(reason) = candidate
            .finish_reason
            .filter(|reason| REFUSAL_FINISH_REASONS.contains(&reason.as_str()))
        {
            return Err(LlmError::Blocked { reason });
        }
        return Err(LlmError::InvalidResponse {
            message: "response contained no text".to_string(),
        });
    }

    Ok(Completion {
        text,
        finish_reason: candidate.finish_reason,
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<GenerateContentCandidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentCandidate {
    content: Option<GenerateContentContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentContent {
    parts: Option<Vec<GenerateContentPart>>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentPart {
    text: Option<String>,
}
