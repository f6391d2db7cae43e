//! Application layer - orchestration over the provider port.
//!
//! This layer coordinates the domain and the AI providers: health
//! monitoring, dispatch with failover, and the analysis service facade the
//! rest of the product calls.

pub mod analysis_service;
pub mod dispatcher;
pub mod health;

pub use analysis_service::AnalysisService;
pub use dispatcher::{CompletionDispatcher, DispatchError};
pub use health::{HealthStatus, ProviderHealth, ProviderHealthMonitor, ServiceStatus};
