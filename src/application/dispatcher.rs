//! Completion Dispatcher - routes requests to an available provider.
//!
//! Every dispatch starts with a fresh health check. If nothing is available
//! the request fails fast without touching a provider. Otherwise candidates
//! are tried in preference order; a provider failure is logged and the next
//! candidate gets the same request. Only when every candidate has been
//! exhausted does the caller see an error, and it is always
//! [`DispatchError::AllProvidersUnavailable`].
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = CompletionDispatcher::new(Arc::new(openai))
//!     .with_fallback(Arc::new(gemini));
//!
//! let text = dispatcher.dispatch(request).await?;
//! ```

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::health::{HealthStatus, ProviderHealthMonitor};
use crate::ports::{AiProvider, CompletionRequest, ProviderError};

/// Dispatch failure. The only error the orchestration layer surfaces.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No provider could take the request, either because none passed the
    /// availability check or because every available one failed.
    #[error("all AI providers unavailable: {reason}")]
    AllProvidersUnavailable {
        /// Last provider error seen, or the health-check verdict.
        reason: String,
    },
}

/// Routes completion requests across the configured providers.
pub struct CompletionDispatcher {
    /// Candidates in preference order. The first entry is tried first.
    providers: Vec<Arc<dyn AiProvider>>,
}

impl CompletionDispatcher {
    /// Creates a dispatcher with a single provider.
    pub fn new(preferred: Arc<dyn AiProvider>) -> Self {
        Self {
            providers: vec![preferred],
        }
    }

    /// Adds a fallback provider, tried when the preferred one cannot answer.
    pub fn with_fallback(mut self, fallback: Arc<dyn AiProvider>) -> Self {
        self.providers.push(fallback);
        self
    }

    /// Probes every provider. Results are never cached; each call pings.
    pub async fn check_health(&self) -> HealthStatus {
        ProviderHealthMonitor::new(self.providers.clone()).check().await
    }

    /// Sends the request to the first available provider that answers.
    ///
    /// Health is re-evaluated at the top of every dispatch, so a provider
    /// that recovered since the last call is back in rotation and one that
    /// just went down is skipped without being invoked.
    pub async fn dispatch(&self, request: CompletionRequest) -> Result<String, DispatchError> {
        let request_id = Uuid::new_v4();
        let health = self.check_health().await;

        if !health.is_healthy() {
            warn!(%request_id, "no providers available, failing fast");
            return Err(DispatchError::AllProvidersUnavailable {
                reason: "no providers passed the availability check".to_string(),
            });
        }

        let mut last_error: Option<ProviderError> = None;

        for (provider, entry) in self.providers.iter().zip(&health.providers) {
            if !entry.available {
                debug!(%request_id, provider = %entry.provider, "skipping unavailable provider");
                continue;
            }

            debug!(%request_id, provider = %entry.provider, "dispatching completion");

            match provider.complete(request.clone()).await {
                Ok(text) => {
                    debug!(
                        %request_id,
                        provider = %entry.provider,
                        response_chars = text.len(),
                        "completion succeeded"
                    );
                    return Ok(text);
                }
                Err(err) => {
                    warn!(
                        %request_id,
                        provider = %entry.provider,
                        error = %err,
                        "provider failed, trying next candidate"
                    );
                    last_error = Some(err);
                }
            }
        }

        let reason = match last_error {
            Some(err) => err.to_string(),
            None => "no providers passed the availability check".to_string(),
        };

        warn!(%request_id, %reason, "all candidates exhausted");
        Err(DispatchError::AllProvidersUnavailable { reason })
    }
}
