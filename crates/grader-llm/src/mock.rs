use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::traits::{InvocationResult, InvokeRequest, LlmError, ModelClient};

/// Answer returned when no canned response is configured
const DEFAULT_RESPONSE: &str = r#"{"grade": 0, "total_points": 0, "feedback": "Mock evaluation", "strengths": [], "improvements": []}"#;

/// Mock model client for testing and offline runs
///
/// Returns a canned response and records every request it receives.
#[derive(Debug)]
pub struct MockModelClient {
    response_text: String,
    input_tokens: u64,
    output_tokens: u64,
    calls: AtomicUsize,
    last_request: Mutex<Option<InvokeRequest>>,
}

impl MockModelClient {
    /// Create a mock that answers with a zero-point grading object
    pub fn new() -> Self {
        Self::with_response(DEFAULT_RESPONSE)
    }

    /// Create a mock that always answers with `response_text`
    pub fn with_response(response_text: impl Into<String>) -> Self {
        Self {
            response_text: response_text.into(),
            input_tokens: 0,
            output_tokens: 0,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Report the given token usage on every call
    pub fn with_usage(mut self, input_tokens: u64, output_tokens: u64) -> Self {
        self.input_tokens = input_tokens;
        self.output_tokens = output_tokens;
        self
    }

    /// Number of accepted invocations so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent accepted request
    pub fn last_request(&self) -> Option<InvokeRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn invoke(&self, request: &InvokeRequest) -> Result<InvocationResult, LlmError> {
        request.validate()?;

        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.last_request.lock() {
            Ok(mut guard) => *guard = Some(request.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(request.clone()),
        }

        Ok(InvocationResult {
            response_text: self.response_text.clone(),
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            model_id: request.model_id.clone(),
            timestamp: Utc::now(),
        })
    }

    fn provider_name(&self) -> String {
        "mock".to_string()
    }
}
