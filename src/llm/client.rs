//! Async LLM client - the production reasoning service
//!
//! This is a model-agnostic HTTP client for calling LLM APIs.
//! Supports both Anthropic and OpenAI-compatible APIs (Gemini's OpenAI
//! endpoint, DeepSeek, etc). Proxies come from the usual HTTP(S)_PROXY
//! environment variables via reqwest.

use crate::core::config::LlmConfig;
use crate::core::error::{ArenaError, Result};
use crate::llm::service::{Prompt, ReasoningService};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ArenaError::Config(format!("Failed to build HTTP client: {}", e)))?;
        let api_format = Self::detect_api_format(&config.api_url);
        Ok(Self {
            client,
            config,
            api_format,
        })
    }

    /// Create a client from environment variables (see [`LlmConfig::from_env`])
    pub fn from_env() -> Result<Self> {
        Self::new(LlmConfig::from_env()?)
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete_anthropic(&self, prompt: &Prompt<'_>) -> Result<String> {
        // No JSON mode on this API; the schema instructions in the system
        // prompt have to carry it.
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: 8192,
            temperature: self.config.temperature,
            system: prompt.system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: prompt.user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ArenaError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ArenaError::Generation(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ArenaError::Generation(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| ArenaError::Generation("Empty response".into()))
    }

    async fn complete_openai(&self, prompt: &Prompt<'_>) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if !prompt.system.is_empty() {
            messages.push(Message {
                role: "system".into(),
                content: prompt.system.into(),
            });
        }
        messages.push(Message {
            role: "user".into(),
            content: prompt.user.into(),
        });

        let request = OpenAIRequest {
            model: self.config.model.clone(),
            max_tokens: 8192,
            temperature: self.config.temperature,
            messages,
            response_format: prompt.expect_json.then(|| ResponseFormat {
                kind: "json_object".into(),
            }),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ArenaError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ArenaError::Generation(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ArenaError::Generation(e.to_string()))?;

        completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ArenaError::Generation("Empty response".into()))
    }
}

impl ReasoningService for LlmClient {
    async fn complete(&self, prompt: &Prompt<'_>) -> Result<String> {
        tracing::debug!(model = %self.config.model, json = prompt.expect_json, "LLM request");
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(prompt).await,
            ApiFormat::OpenAI => self.complete_openai(prompt).await,
        }
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
