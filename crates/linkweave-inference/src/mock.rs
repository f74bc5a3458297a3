//! Mock backends for deterministic testing.
//!
//! Both mocks record every call so tests can assert that a precondition
//! failure never reached a provider.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use linkweave_inference::mock::MockSuggestionBackend;
//! use serde_json::json;
//!
//! let backend = MockSuggestionBackend::new().with_json(json!({"suggestions": []}));
//! assert_eq!(backend.call_count(), 0);
//! ```

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use linkweave_core::{Error, RagSource, Result, SourceBackend, SuggestionBackend};

/// Canned outcome for a mock call.
#[derive(Debug, Clone)]
pub enum MockReply<T> {
    Ok(T),
    ApiError { status: u16, body: String },
    InvalidResponse(String),
    ConfigMissing(String),
}

impl<T: Clone> MockReply<T> {
    fn to_result(&self) -> Result<T> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::ApiError { status, body } => Err(Error::ApiError {
                status: *status,
                body: body.clone(),
            }),
            Self::InvalidResponse(msg) => Err(Error::InvalidResponse(msg.clone())),
            Self::ConfigMissing(msg) => Err(Error::ConfigMissing(msg.clone())),
        }
    }
}

#[derive(Debug, Clone)]
struct MockState<T> {
    reply: MockReply<T>,
    latency: Duration,
    calls: Arc<Mutex<Vec<String>>>,
}

impl<T: Clone> MockState<T> {
    fn new(reply: MockReply<T>) -> Self {
        Self {
            reply,
            latency: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn call(&self, input: &str) -> Result<T> {
        self.calls.lock().unwrap().push(input.to_string());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.reply.to_result()
    }
}

/// Mock LLM backend.
#[derive(Debug, Clone)]
pub struct MockSuggestionBackend {
    state: MockState<JsonValue>,
}

impl Default for MockSuggestionBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSuggestionBackend {
    /// Replies `{"suggestions": []}` until configured otherwise.
    pub fn new() -> Self {
        Self {
            state: MockState::new(MockReply::Ok(json!({"suggestions": []}))),
        }
    }

    pub fn with_json(mut self, value: JsonValue) -> Self {
        self.state.reply = MockReply::Ok(value);
        self
    }

    pub fn with_reply(mut self, reply: MockReply<JsonValue>) -> Self {
        self.state.reply = reply;
        self
    }

    /// Simulated latency before replying.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.state.latency = latency;
        self
    }

    pub fn call_count(&self) -> usize {
        self.state.calls.lock().unwrap().len()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SuggestionBackend for MockSuggestionBackend {
    async fn get_suggestions(&self, prompt: &str) -> Result<JsonValue> {
        self.state.call(prompt).await
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

/// Mock RAG backend.
#[derive(Debug, Clone)]
pub struct MockSourceBackend {
    state: MockState<Vec<RagSource>>,
}

impl Default for MockSourceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSourceBackend {
    /// Replies with no sources until configured otherwise.
    pub fn new() -> Self {
        Self {
            state: MockState::new(MockReply::Ok(Vec::new())),
        }
    }

    pub fn with_sources(mut self, sources: Vec<RagSource>) -> Self {
        self.state.reply = MockReply::Ok(sources);
        self
    }

    pub fn with_reply(mut self, reply: MockReply<Vec<RagSource>>) -> Self {
        self.state.reply = reply;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.state.latency = latency;
        self
    }

    pub fn call_count(&self) -> usize {
        self.state.calls.lock().unwrap().len()
    }

    /// Queries received, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceBackend for MockSourceBackend {
    async fn get_sources(&self, query: &str) -> Result<Vec<RagSource>> {
        self.state.call(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_llm_records_calls() {
        let backend = MockSuggestionBackend::new().with_json(json!([1, 2]));
        let clone = backend.clone();
        assert_eq!(backend.get_suggestions("p1").await.unwrap(), json!([1, 2]));
        assert_eq!(clone.call_count(), 1);
        assert_eq!(clone.prompts(), vec!["p1".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_error_reply() {
        let backend = MockSourceBackend::new().with_reply(MockReply::ApiError {
            status: 503,
            body: "down".into(),
        });
        let err = backend.get_sources("q").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(backend.queries(), vec!["q".to_string()]);
    }
}
