//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## AI Provider Port
//!
//! - `AiProvider` - Text-generation seam implemented by each provider adapter
//! - `CompletionRequest` - System prompt + conversation turns
//! - `ProviderInfo` - Provider name and configured model
//! - `ProviderError` - Single-provider failure taxonomy

mod ai_provider;

pub use ai_provider::{AiProvider, CompletionRequest, ProviderError, ProviderInfo};
