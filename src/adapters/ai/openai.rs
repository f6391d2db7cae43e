//! OpenAI Provider - chat-style implementation of `AiProvider`.
//!
//! Sends the system prompt and conversation turns as a chat-completions
//! message array. Health pings hit the models endpoint with the same
//! credentials.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiConfig::new(api_key)
//!     .with_model("gpt-4o")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let provider = OpenAiProvider::new(config);
//! ```
//!
//! Calls are single-shot: a failure maps to [`ProviderError`] and the
//! dispatcher decides whether the other provider gets the request.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::context::TurnRole;
use crate::ports::{AiProvider, CompletionRequest, ProviderError, ProviderInfo};

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gpt-4o", "gpt-4-turbo").
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Sampling temperature applied to every request.
    pub temperature: f32,
    /// Output token cap applied to every request.
    pub max_output_tokens: u32,
}

impl OpenAiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.3,
            max_output_tokens: 4096,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the output token cap.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI API provider implementation.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    /// Creates a new OpenAI provider with the given configuration.
    pub fn new(config: OpenAiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Builds the models endpoint URL (health pings).
    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url)
    }

    /// Converts our request to OpenAI's format.
    fn to_wire_request(&self, request: &CompletionRequest) -> OpenAiRequest {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);

        messages.push(OpenAiMessage {
            role: "system".to_string(),
            content: request.system_prompt.clone(),
        });

        for turn in &request.turns {
            messages.push(OpenAiMessage {
                role: match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Assistant => "assistant",
                }
                .to_string(),
                content: turn.content.clone(),
            });
        }

        OpenAiRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_output_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Maps reqwest transport failures to provider errors.
    fn transport_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if error.is_connect() {
            ProviderError::unreachable(format!("connection failed: {}", error))
        } else {
            ProviderError::unreachable(error.to_string())
        }
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, ProviderError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(ProviderError::AuthenticationFailed),
            429 => Err(ProviderError::quota_exceeded(error_message(&error_body))),
            500..=599 => Err(ProviderError::unavailable(format!(
                "server error {}: {}",
                status,
                error_message(&error_body)
            ))),
            _ => Err(ProviderError::invalid_request(format!(
                "status {}: {}",
                status,
                error_message(&error_body)
            ))),
        }
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        debug!(
            model = %self.config.model,
            turns = request.turns.len(),
            prompt_chars = request.system_prompt.len(),
            "sending openai completion request"
        );

        let wire_request = self.to_wire_request(&request);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = self.handle_response_status(response).await?;

        let body: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("failed to decode response: {}", e)))?;

        content_from_response(body)
    }

    async fn ping(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(self.models_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response_status(response).await.map(|_| ())
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", &self.config.model)
    }
}

/// Extracts the completion text from a decoded response body.
fn content_from_response(body: OpenAiResponse) -> Result<String, ProviderError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::malformed("no choices in response"))?;

    Ok(choice.message.content)
}

/// Pulls the human-readable message out of an OpenAI error body, falling back
/// to the raw body.
fn error_message(error_body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|parsed| {
            parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| error_body.to_string())
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}
