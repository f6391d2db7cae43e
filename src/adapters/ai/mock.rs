//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AiProvider port,
//! allowing tests to run without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses (consumed in order)
//! - Forced ping failures for availability testing
//! - Error injection for fallback testing
//! - Separate call and ping tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAiProvider::new()
//!     .with_response("Respuesta del asistente.");
//!
//! let text = provider.complete(request).await?;
//! assert_eq!(text, "Respuesta del asistente.");
//! assert_eq!(provider.call_count(), 1);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AiProvider, CompletionRequest, ProviderError, ProviderInfo};

/// Mock AI provider for testing.
///
/// Configurable to return specific responses, fail pings, or inject errors.
#[derive(Debug, Clone)]
pub struct MockAiProvider {
    /// Pre-configured completion outcomes (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Forced ping failure. `None` means the provider reports healthy.
    ping_error: Arc<Mutex<Option<MockError>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency per call (applies to completions and pings).
    delay: Duration,
    /// Completion call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Number of pings received.
    pings: Arc<Mutex<usize>>,
}

/// A configured mock completion outcome.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this text.
    Success(String),
    /// Return an error.
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate a connection failure.
    Unreachable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate quota exhaustion.
    QuotaExceeded { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u64 },
    /// Simulate a rejected request.
    InvalidRequest { message: String },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate an undecodable response.
    Malformed { message: String },
}

impl From<MockError> for ProviderError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::Unreachable { message } => ProviderError::unreachable(message),
            MockError::AuthenticationFailed => ProviderError::AuthenticationFailed,
            MockError::QuotaExceeded { message } => ProviderError::quota_exceeded(message),
            MockError::Timeout { timeout_secs } => ProviderError::Timeout { timeout_secs },
            MockError::InvalidRequest { message } => ProviderError::invalid_request(message),
            MockError::Unavailable { message } => ProviderError::unavailable(message),
            MockError::Malformed { message } => ProviderError::malformed(message),
        }
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAiProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self::named("mock", "mock-model-1")
    }

    /// Creates a new mock provider with a specific identity.
    pub fn named(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            ping_error: Arc::new(Mutex::new(None)),
            info: ProviderInfo::new(name, model),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            pings: Arc::new(Mutex::new(0)),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        let mut responses = self.responses.lock().unwrap();
        responses.push_back(MockResponse::Success(content.into()));
        drop(responses);
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        let mut responses = self.responses.lock().unwrap();
        responses.push_back(MockResponse::Error(error));
        drop(responses);
        self
    }

    /// Makes every ping fail with the given error.
    pub fn with_ping_error(self, error: MockError) -> Self {
        *self.ping_error.lock().unwrap() = Some(error);
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Changes ping behavior mid-test. `None` restores healthy pings.
    pub fn set_ping_error(&self, error: Option<MockError>) {
        *self.ping_error.lock().unwrap() = error;
    }

    /// Returns the number of completion calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns the number of pings received.
    pub fn ping_count(&self) -> usize {
        *self.pings.lock().unwrap()
    }

    /// Returns all recorded completion calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Gets the next response or a default.
    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success("Respuesta simulada.".to_string()))
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        // Record the call
        self.calls.lock().unwrap().push(request);

        // Simulate delay
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        // Get configured response
        match self.next_response() {
            MockResponse::Success(content) => Ok(content),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    async fn ping(&self) -> Result<(), ProviderError> {
        *self.pings.lock().unwrap() += 1;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.ping_error.lock().unwrap().clone() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
