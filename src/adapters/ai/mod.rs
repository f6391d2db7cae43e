//! AI Provider Adapters.
//!
//! Implementations of the AiProvider port for the two supported LLM services.
//!
//! ## Available Adapters
//!
//! - `OpenAiProvider` - OpenAI chat models, chat-completions message array
//! - `GeminiProvider` - Google Gemini models, single flattened prompt
//! - `MockAiProvider` - Configurable mock for testing

mod gemini;
mod mock;
mod openai;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use mock::{MockAiProvider, MockError, MockResponse};
pub use openai::{OpenAiConfig, OpenAiProvider};
