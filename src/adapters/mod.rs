//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - AI provider integrations (OpenAI, Gemini, mock)

pub mod ai;

pub use ai::{GeminiConfig, GeminiProvider, MockAiProvider, OpenAiConfig, OpenAiProvider};
