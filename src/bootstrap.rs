//! Composition root - builds the analysis service from configuration.
//!
//! Wires each provider that has an API key, orders them by the configured
//! preference, and hands the dispatcher to [`AnalysisService`]. A preferred
//! provider without a key is skipped, not an error; configuration with no
//! keys at all is rejected.

use std::sync::Arc;
use tracing::info;

use crate::adapters::ai::{GeminiConfig, GeminiProvider, OpenAiConfig, OpenAiProvider};
use crate::application::{AnalysisService, CompletionDispatcher};
use crate::config::{AiConfig, AppConfig, ConfigError, ProviderKind, ValidationError};
use crate::ports::AiProvider;

/// Builds the analysis service for the given configuration.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationFailed`] when the configuration is
/// invalid, including when no provider has an API key.
pub fn analysis_service(config: &AppConfig) -> Result<AnalysisService, ConfigError> {
    config.validate()?;

    let ai = &config.ai;
    let openai = build_openai(ai);
    let gemini = build_gemini(ai);

    let (first, second) = match ai.preferred_provider {
        ProviderKind::OpenAi => (openai, gemini),
        ProviderKind::Gemini => (gemini, openai),
    };

    let mut candidates = first.into_iter().chain(second);

    let preferred = candidates
        .next()
        .ok_or(ConfigError::ValidationFailed(ValidationError::NoAiProviderConfigured))?;
    let fallback = candidates.next();

    let preferred_name = preferred.info().name;
    let fallback_name = fallback
        .as_deref()
        .map(|p| p.info().name)
        .unwrap_or_else(|| "none".to_string());
    info!(preferred = %preferred_name, fallback = %fallback_name, "analysis service wired");

    let mut dispatcher = CompletionDispatcher::new(preferred);
    if let Some(fallback) = fallback {
        dispatcher = dispatcher.with_fallback(fallback);
    }

    Ok(AnalysisService::new(dispatcher))
}

fn build_openai(ai: &AiConfig) -> Option<Arc<dyn AiProvider>> {
    if !ai.has_openai() {
        return None;
    }
    let key = ai.openai_api_key.clone()?;

    Some(Arc::new(OpenAiProvider::new(
        OpenAiConfig::new(key)
            .with_model(ai.openai_model.clone())
            .with_timeout(ai.timeout())
            .with_temperature(ai.temperature)
            .with_max_output_tokens(ai.max_output_tokens),
    )))
}

fn build_gemini(ai: &AiConfig) -> Option<Arc<dyn AiProvider>> {
    if !ai.has_gemini() {
        return None;
    }
    let key = ai.gemini_api_key.clone()?;

    Some(Arc::new(GeminiProvider::new(
        GeminiConfig::new(key)
            .with_model(ai.gemini_model.clone())
            .with_timeout(ai.timeout())
            .with_temperature(ai.temperature)
            .with_max_output_tokens(ai.max_output_tokens),
    )))
}
