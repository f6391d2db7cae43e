//! Gemini Provider - single-prompt implementation of `AiProvider`.
//!
//! Gemini's generateContent endpoint takes one user content block, so the
//! system prompt and the conversation turns are flattened into a single
//! labeled transcript before sending. Health pings list models with the
//! same key.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-1.5-pro")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let provider = GeminiProvider::new(config);
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

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication (sent as a query parameter).
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-1.5-pro", "gemini-1.5-flash").
    pub model: String,
    /// Base URL for the API (default: https://generativelanguage.googleapis.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Sampling temperature applied to every request.
    pub temperature: f32,
    /// Output token cap applied to every request.
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-1.5-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
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

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the generateContent endpoint URL for the configured model.
    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Builds the models endpoint URL (health pings).
    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.config.base_url)
    }

    /// Converts our request to Gemini's single-content format.
    fn to_wire_request(&self, request: &CompletionRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: flatten_request(request),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
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
impl AiProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        debug!(
            model = %self.config.model,
            turns = request.turns.len(),
            prompt_chars = request.system_prompt.len(),
            "sending gemini completion request"
        );

        let wire_request = self.to_wire_request(&request);

        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.config.api_key())])
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = self.handle_response_status(response).await?;

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("failed to decode response: {}", e)))?;

        content_from_response(body)
    }

    async fn ping(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(self.models_url())
            .query(&[("key", self.config.api_key()), ("pageSize", "1")])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response_status(response).await.map(|_| ())
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model)
    }
}

/// Flattens a request into the single prompt Gemini receives: the system
/// prompt, a blank line, then one labeled line per turn.
fn flatten_request(request: &CompletionRequest) -> String {
    if request.turns.is_empty() {
        return request.system_prompt.clone();
    }

    let mut prompt = String::with_capacity(request.system_prompt.len() + 64);
    prompt.push_str(&request.system_prompt);
    prompt.push('\n');

    for turn in &request.turns {
        prompt.push('\n');
        let label = match turn.role {
            TurnRole::User => "Usuario",
            TurnRole::Assistant => "Asistente",
        };
        prompt.push_str(label);
        prompt.push_str(": ");
        prompt.push_str(&turn.content);
    }

    prompt
}

/// Extracts the completion text from a decoded response body.
fn content_from_response(body: GeminiResponse) -> Result<String, ProviderError> {
    if let Some(feedback) = &body.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(ProviderError::malformed(format!(
                "prompt blocked: {}",
                reason
            )));
        }
    }

    let candidate = body
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::malformed("no candidates in response"))?;

    let text: String = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(ProviderError::malformed("candidate carried no text"));
    }

    Ok(text)
}

/// Pulls the human-readable message out of a Gemini error body, falling back
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

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_works() {
        let config = GeminiConfig::new("test-key")
            .with_model("gemini-1.5-flash")
            .with_base_url("https://custom.googleapis.test")
            .with_timeout(Duration::from_secs(20))
            .with_temperature(0.5)
            .with_max_output_tokens(1024);

        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.base_url, "https://custom.googleapis.test");
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.max_output_tokens, 1024);
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn urls_are_built_from_base_and_model() {
        let provider = GeminiProvider::new(GeminiConfig::new("test"));
        assert_eq!(
            provider.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(
            provider.models_url(),
            "https://generativelanguage.googleapis.com/v1beta/models"
        );
    }

    mod flattening {
        use super::*;

        #[test]
        fn system_prompt_alone_passes_through() {
            let request = CompletionRequest::new("Eres un analista de contratación pública.");
            assert_eq!(
                flatten_request(&request),
                "Eres un analista de contratación pública."
            );
        }

        #[test]
        fn turns_become_labeled_lines() {
            let request = CompletionRequest::new("Contexto del sistema.")
                .with_turn(TurnRole::User, "¿Qué garantías exige el pliego?")
                .with_turn(TurnRole::Assistant, "Exige garantía de fiel cumplimiento.")
                .with_turn(TurnRole::User, "¿Por qué monto?");

            assert_eq!(
                flatten_request(&request),
                "Contexto del sistema.\n\
                 \n\
                 Usuario: ¿Qué garantías exige el pliego?\n\
                 Asistente: Exige garantía de fiel cumplimiento.\n\
                 Usuario: ¿Por qué monto?"
            );
        }
    }

    mod wire_format {
        use super::*;

        #[test]
        fn request_carries_single_user_content() {
            let provider = GeminiProvider::new(GeminiConfig::new("test"));
            let request = CompletionRequest::new("prompt")
                .with_turn(TurnRole::User, "hola");

            let wire = provider.to_wire_request(&request);

            assert_eq!(wire.contents.len(), 1);
            assert_eq!(wire.contents[0].role, "user");
            assert_eq!(wire.contents[0].parts.len(), 1);
            assert_eq!(wire.contents[0].parts[0].text, "prompt\n\nUsuario: hola");
        }

        #[test]
        fn generation_config_serializes_camel_case() {
            let provider = GeminiProvider::new(
                GeminiConfig::new("test")
                    .with_temperature(0.2)
                    .with_max_output_tokens(256),
            );
            let wire = provider.to_wire_request(&CompletionRequest::new("p"));
            let json = serde_json::to_value(&wire).unwrap();

            assert_eq!(json["generationConfig"]["temperature"], 0.2);
            assert_eq!(json["generationConfig"]["maxOutputTokens"], 256);
        }
    }

    mod response_parsing {
        use super::*;

        #[test]
        fn parts_are_concatenated() {
            let body: GeminiResponse = serde_json::from_str(
                r#"{"candidates":[{"content":{"parts":[{"text":"Análisis "},{"text":"completo."}]}}]}"#,
            )
            .unwrap();

            assert_eq!(content_from_response(body).unwrap(), "Análisis completo.");
        }

        #[test]
        fn blocked_prompt_is_malformed() {
            let body: GeminiResponse = serde_json::from_str(
                r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#,
            )
            .unwrap();

            let err = content_from_response(body).unwrap_err();
            assert!(err.to_string().contains("prompt blocked: SAFETY"));
        }

        #[test]
        fn missing_candidates_is_malformed() {
            let body: GeminiResponse = serde_json::from_str(r#"{}"#).unwrap();
            let err = content_from_response(body).unwrap_err();
            assert!(matches!(err, ProviderError::MalformedResponse(_)));
        }

        #[test]
        fn candidate_without_text_is_malformed() {
            let body: GeminiResponse =
                serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
            let err = content_from_response(body).unwrap_err();
            assert!(err.to_string().contains("candidate carried no text"));
        }
    }

    #[test]
    fn provider_info_reports_identity() {
        let provider =
            GeminiProvider::new(GeminiConfig::new("test").with_model("gemini-1.5-flash"));
        let info = provider.info();
        assert_eq!(info.name, "gemini");
        assert_eq!(info.model, "gemini-1.5-flash");
    }
}
