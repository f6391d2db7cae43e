//! AI Provider Port - Interface for LLM provider integrations.
//!
//! This port abstracts the two external text-generation services (OpenAI,
//! Gemini) behind a single seam so the dispatcher can select, health-check,
//! and invoke providers without coupling to either API.
//!
//! # Design
//!
//! - Text in, text out: providers share nothing beyond this trait. Each
//!   adapter builds its own wire shape (chat message array vs. one
//!   concatenated prompt).
//! - Sampling parameters are fixed per provider at construction; a request
//!   carries only the system prompt and the conversation turns.
//! - No internal retry. A failed call surfaces as [`ProviderError`] and the
//!   dispatcher decides whether a second provider gets the request.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl AiProvider for EchoProvider {
//!     async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
//!         Ok(request.system_prompt)
//!     }
//!
//!     async fn ping(&self) -> Result<(), ProviderError> {
//!         Ok(())
//!     }
//!
//!     fn info(&self) -> ProviderInfo {
//!         ProviderInfo::new("echo", "echo-1")
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::context::{ConversationTurn, TurnRole};

/// Port for text-generation providers.
///
/// Implementations connect to one external AI service and translate between
/// its API and the crate's request/error types.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Executes one conversational turn and returns the model's text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    /// Minimal no-op call proving the provider is reachable and the
    /// credentials are accepted (a models-list request, bounded by the
    /// caller's timeout).
    async fn ping(&self) -> Result<(), ProviderError>;

    /// Static provider identity (name + configured model).
    fn info(&self) -> ProviderInfo;
}

/// Request for a completion: system prompt plus ordered history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System prompt guiding the model. Always non-empty; prompt builders
    /// produce it.
    pub system_prompt: String,
    /// Conversation turns, oldest first. May be empty for one-shot analysis
    /// requests.
    pub turns: Vec<ConversationTurn>,
}

impl CompletionRequest {
    /// Creates a request with no history.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            turns: Vec::new(),
        }
    }

    /// Appends one turn to the history.
    pub fn with_turn(mut self, role: TurnRole, content: impl Into<String>) -> Self {
        self.turns.push(match role {
            TurnRole::User => ConversationTurn::user(content),
            TurnRole::Assistant => ConversationTurn::assistant(content),
        });
        self
    }

    /// Replaces the history with an already-assembled turn list.
    pub fn with_turns(mut self, turns: Vec<ConversationTurn>) -> Self {
        self.turns = turns;
        self
    }
}

/// Provider identity reported by health checks and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "openai", "gemini").
    pub name: String,
    /// Model identifier (e.g., "gpt-4o", "gemini-1.5-pro").
    pub model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Single-provider failure. Caught by the dispatcher; never escapes it.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Connection or DNS failure before any HTTP status arrived.
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    /// API key rejected (401/403).
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Rate limit or quota exhausted (429).
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// Provider rejected the request shape (other 4xx).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider-side failure (5xx).
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Response body could not be decoded, or carried no usable text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Creates an unreachable error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable(message.into())
    }

    /// Creates a quota exceeded error.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded(message.into())
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}
