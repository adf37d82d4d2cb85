//! HTTP-backed generative model client.
//!
//! Supports OpenAI-compatible APIs, Anthropic, and Ollama behind one
//! config switch. Requests are non-streaming: the pipeline parses the
//! whole response as structured JSON, so tokens have no value before the
//! response is complete.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::{CompletionRequest, GenerativeBackend};
use crate::error::BackendError;

/// Connection settings for an HTTP model backend. The API key arrives
/// already resolved; reading key material out of the environment is the
/// caller's job.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// One of "openai", "anthropic", "ollama", or "custom"
    /// (OpenAI-compatible).
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl HttpBackendConfig {
    pub fn openai(model: &str, api_key: Option<String>) -> Self {
        Self {
            provider: "openai".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    pub fn anthropic(model: &str, api_key: Option<String>) -> Self {
        Self {
            provider: "anthropic".to_string(),
            endpoint: "https://api.anthropic.com/v1".to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    pub fn ollama(model: &str) -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }
}

// =============================================================================
// OpenAI Types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessageResponse {
    /// Content can be null for some models (reasoning models during thinking)
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

// =============================================================================
// Anthropic Types
// =============================================================================

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    system: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorResponse {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    message: String,
}

// =============================================================================
// Ollama Types
// =============================================================================

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaMessageResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessageResponse,
}

// =============================================================================
// Backend
// =============================================================================

/// Client for calling generative model APIs.
pub struct HttpBackend {
    client: reqwest::Client,
    config: HttpBackendConfig,
}

impl HttpBackend {
    /// Create a backend from configuration.
    ///
    /// Fails fast when a key-requiring provider has no API key, so the
    /// pipeline never discovers the gap mid-report.
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        if config.provider != "ollama" && config.api_key.is_none() {
            let env_var = match config.provider.as_str() {
                "anthropic" => "ANTHROPIC_API_KEY",
                _ => "OPENAI_API_KEY",
            };
            return Err(BackendError::MissingApiKey {
                env_var: env_var.to_string(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    /// Check if a model uses the newer OpenAI API format
    /// (max_completion_tokens instead of the deprecated max_tokens).
    fn uses_new_token_param(model: &str) -> bool {
        let model_lower = model.to_lowercase();
        model_lower.contains("gpt-4o")
            || model_lower.contains("gpt-5")
            || model_lower.starts_with("o1")
            || model_lower.starts_with("o3")
            || model_lower.contains("chatgpt-4o")
    }

    async fn call_openai(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let url = format!("{}/chat/completions", self.config.endpoint);
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| BackendError::MissingApiKey {
                env_var: "OPENAI_API_KEY".to_string(),
            })?;

        let (max_tokens, max_completion_tokens, temperature) =
            if Self::uses_new_token_param(&self.config.model) {
                (None, Some(request.max_tokens), None)
            } else {
                (Some(request.max_tokens), None, Some(0.2))
            };

        let body = OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            max_tokens,
            max_completion_tokens,
            temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAIErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        parsed
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| {
                BackendError::Parse(format!(
                    "No response content from model '{}'",
                    self.config.model
                ))
            })
    }

    async fn call_anthropic(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let url = format!("{}/messages", self.config.endpoint);
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| BackendError::MissingApiKey {
                env_var: "ANTHROPIC_API_KEY".to_string(),
            })?;

        let body = AnthropicRequest {
            model: self.config.model.clone(),
            system: request.system.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.user.clone(),
            }],
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        parsed
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| BackendError::Parse("No response content".to_string()))
    }

    async fn call_ollama(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let url = format!("{}/api/chat", self.config.endpoint);

        let body = OllamaRequest {
            model: self.config.model.clone(),
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

#[async_trait]
impl GenerativeBackend for HttpBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        match self.config.provider.as_str() {
            "openai" | "custom" => self.call_openai(request).await,
            "anthropic" => self.call_anthropic(request).await,
            "ollama" => self.call_ollama(request).await,
            other => Err(BackendError::UnsupportedProvider(other.to_string())),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}
