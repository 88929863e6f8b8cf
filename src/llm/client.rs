//! Async LLM client for the mentor chat
//!
//! A model-agnostic HTTP client for chat-completion APIs. Supports the
//! Anthropic Messages API, OpenAI-compatible chat completions, and Google
//! Gemini `generateContent`. The wire format is picked from the API URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::config::{MentorConfig, API_KEY_ENV};
use crate::core::error::{ChatError, ConfigError};
use crate::llm::mentor::{ChatBackend, ChatMessage, ChatRole};

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
    Gemini,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            max_tokens: MentorConfig::default().max_tokens,
            api_format,
        }
    }

    /// Create a client from the mentor config
    ///
    /// Fails if no API key was provided through `ARISE_LLM_API_KEY`.
    pub fn from_config(config: &MentorConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ConfigError::MissingApiKey(API_KEY_ENV))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            api_format: Self::detect_api_format(&config.api_url),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else if url.contains("generativelanguage.googleapis.com") || url.contains(":generateContent") {
            ApiFormat::Gemini
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one conversational turn
    ///
    /// # Arguments
    /// * `system` - Instruction text attached to every request
    /// * `history` - Earlier successful turns, oldest first
    /// * `message` - The new user message
    ///
    /// # Returns
    /// The reply text. Empty if the service answered without any text.
    pub async fn complete(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, history, message).await,
            ApiFormat::OpenAI => self.complete_openai(system, history, message).await,
            ApiFormat::Gemini => self.complete_gemini(system, history, message).await,
        }
    }

    async fn complete_anthropic(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError> {
        let request = anthropic_request(&self.model, self.max_tokens, system, history, message);
        let request = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request);

        let completion: AnthropicResponse = send_json(request).await?;
        Ok(completion
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }

    async fn complete_openai(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError> {
        let request = openai_request(&self.model, self.max_tokens, system, history, message);
        let request = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request);

        let completion: OpenAIResponse = send_json(request).await?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn complete_gemini(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError> {
        let request = gemini_request(self.max_tokens, system, history, message);
        let request = self
            .client
            .post(self.gemini_endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request);

        let completion: GeminiResponse = send_json(request).await?;
        Ok(completion
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default())
    }

    fn gemini_endpoint(&self) -> String {
        if self.api_url.contains(":generateContent") {
            self.api_url.clone()
        } else {
            format!(
                "{}/{}:generateContent",
                self.api_url.trim_end_matches('/'),
                self.model
            )
        }
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn send(
        &self,
        system: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, ChatError> {
        self.complete(system, history, message).await
    }
}

async fn send_json<T: for<'de> Deserialize<'de>>(
    request: reqwest::RequestBuilder,
) -> Result<T, ChatError> {
    let response = request
        .header("content-type", "application/json")
        .send()
        .await
        .map_err(|e| ChatError::ServiceUnavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(ChatError::ServiceUnavailable(format!(
            "API error {status}: {error_text}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ChatError::ServiceUnavailable(e.to_string()))
}

fn anthropic_request(
    model: &str,
    max_tokens: u32,
    system: &str,
    history: &[ChatMessage],
    message: &str,
) -> AnthropicRequest {
    AnthropicRequest {
        model: model.into(),
        max_tokens,
        system: system.into(),
        messages: turns(history, message, "assistant"),
    }
}

fn openai_request(
    model: &str,
    max_tokens: u32,
    system: &str,
    history: &[ChatMessage],
    message: &str,
) -> OpenAIRequest {
    let mut messages = vec![Message {
        role: "system".into(),
        content: system.into(),
    }];
    messages.extend(turns(history, message, "assistant"));
    OpenAIRequest {
        model: model.into(),
        max_tokens,
        messages,
    }
}

fn gemini_request(
    max_tokens: u32,
    system: &str,
    history: &[ChatMessage],
    message: &str,
) -> GeminiRequest {
    GeminiRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(system.into()),
            }],
        },
        contents: turns(history, message, "model")
            .into_iter()
            .map(|m| GeminiContent {
                role: Some(m.role),
                parts: vec![GeminiPart {
                    text: Some(m.content),
                }],
            })
            .collect(),
        generation_config: GeminiGenerationConfig {
            max_output_tokens: max_tokens,
        },
    }
}

/// History plus the new message, with model turns labelled `model_role`
fn turns(history: &[ChatMessage], message: &str, model_role: &str) -> Vec<Message> {
    history
        .iter()
        .map(|m| Message {
            role: match m.role {
                ChatRole::User => "user".into(),
                ChatRole::Model => model_role.into(),
            },
            content: m.text.clone(),
        })
        .chain(std::iter::once(Message {
            role: "user".into(),
            content: message.into(),
        }))
        .collect()
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Gemini generateContent format
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
