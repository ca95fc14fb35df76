//! Mock AI Provider for testing.
//!
//! Replays queued replies and errors in order and records every request,
//! so tests can drive a whole interview without calling a real API.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response("「安定」と「成長」、どちらを選びますか？")
//!     .with_error(AIError::network("offline"));
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo, TokenUsage};

/// Reply used once the queue runs dry.
pub const DEFAULT_MOCK_REPLY: &str = "そのときのことを、もう少し詳しく教えてください。";

/// Mock AI provider for testing.
///
/// Clones share the same queue and call log.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    responses: Arc<Mutex<VecDeque<Result<String, AIError>>>>,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-interviewer"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful reply.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push_response(content);
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: AIError) -> Self {
        self.push_error(error);
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a reply on a provider that has already been shared.
    pub fn push_response(&self, content: impl Into<String>) {
        lock(&self.responses).push_back(Ok(content.into()));
    }

    pub fn push_error(&self, error: AIError) {
        lock(&self.responses).push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded requests.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    pub fn last_call(&self) -> Option<CompletionRequest> {
        lock(&self.calls).last().cloned()
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = lock(&self.responses).pop_front();
        match next.unwrap_or_else(|| Ok(DEFAULT_MOCK_REPLY.to_string())) {
            Ok(content) => Ok(CompletionResponse {
                content,
                usage: TokenUsage::new(10, 20),
                model: self.info.model.clone(),
                finish_reason: crate::ports::FinishReason::Stop,
            }),
            Err(err) => Err(err),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
