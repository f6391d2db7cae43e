//! Provider Health Monitor - live availability checks for AI providers.
//!
//! Health is probed, never cached: every check pings each configured
//! provider and reports what it saw at that instant. The overall service is
//! healthy while at least one provider answers.
//!
//! `check` is infallible. A provider that errors, times out, or rejects the
//! credentials shows up as unavailable in the report; nothing propagates to
//! the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ports::AiProvider;

/// Upper bound on a single availability ping.
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Overall service availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// At least one provider is answering.
    Healthy,
    /// No provider is answering.
    Unhealthy,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Healthy => write!(f, "healthy"),
            ServiceStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Availability of one provider at the moment it was probed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderHealth {
    /// Provider name (e.g., "openai", "gemini").
    pub provider: String,
    /// Whether the ping succeeded.
    pub available: bool,
    /// Configured model for this provider.
    pub model: String,
    /// When the ping ran.
    pub checked_at: DateTime<Utc>,
}

/// Snapshot of provider availability, ordered by dispatch preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Overall availability.
    pub overall: ServiceStatus,
    /// Name of the provider tried first by the dispatcher.
    pub preferred_provider: String,
    /// Per-provider results, preferred first.
    pub providers: Vec<ProviderHealth>,
}

impl HealthStatus {
    /// True while at least one provider is available.
    pub fn is_healthy(&self) -> bool {
        self.overall == ServiceStatus::Healthy
    }

    /// Looks up one provider's entry by name.
    pub fn provider(&self, name: &str) -> Option<&ProviderHealth> {
        self.providers.iter().find(|p| p.provider == name)
    }

    /// The entries that answered their ping, in dispatch order.
    pub fn available(&self) -> impl Iterator<Item = &ProviderHealth> {
        self.providers.iter().filter(|p| p.available)
    }
}

/// Probes the configured providers and assembles a [`HealthStatus`].
///
/// Holds the same provider handles as the dispatcher, in the same order:
/// the first entry is the preferred provider.
pub struct ProviderHealthMonitor {
    providers: Vec<Arc<dyn AiProvider>>,
}

impl ProviderHealthMonitor {
    /// Creates a monitor over the given providers, preferred first.
    pub fn new(providers: Vec<Arc<dyn AiProvider>>) -> Self {
        Self { providers }
    }

    /// Pings every provider and reports what answered.
    ///
    /// Each ping is bounded by [`PING_TIMEOUT`]; a slow provider is reported
    /// unavailable rather than stalling the check.
    pub async fn check(&self) -> HealthStatus {
        debug!(providers = self.providers.len(), "running provider health check");

        let mut entries = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let info = provider.info();
            let available = match tokio::time::timeout(PING_TIMEOUT, provider.ping()).await {
                Ok(Ok(())) => {
                    debug!(provider = %info.name, "provider ping ok");
                    true
                }
                Ok(Err(err)) => {
                    warn!(provider = %info.name, error = %err, "provider ping failed");
                    false
                }
                Err(_) => {
                    warn!(
                        provider = %info.name,
                        timeout_secs = PING_TIMEOUT.as_secs(),
                        "provider ping timed out"
                    );
                    false
                }
            };

            entries.push(ProviderHealth {
                provider: info.name,
                available,
                model: info.model,
                checked_at: Utc::now(),
            });
        }

        let overall = if entries.iter().any(|e| e.available) {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        };

        HealthStatus {
            overall,
            preferred_provider: self
                .providers
                .first()
                .map(|p| p.info().name)
                .unwrap_or_default(),
            providers: entries,
        }
    }
}
