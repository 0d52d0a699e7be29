use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::traits::{InvocationResult, InvokeRequest, LlmError, ModelClient};
use crate::wire::{MessagesRequest, read_response};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ClaudeClient {
    /// Create a new Claude client
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a Claude client with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        info!("Initialized ClaudeClient for {}", base_url);
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl ModelClient for ClaudeClient {
    async fn invoke(&self, request: &InvokeRequest) -> Result<InvocationResult, LlmError> {
        request.validate()?;

        let body = MessagesRequest {
            model: Some(request.model_id.as_str()),
            ..MessagesRequest::from_request(request)
        };

        debug!(
            "Invoking model {} with {} messages",
            request.model_id,
            request.messages.len()
        );

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        read_response(&request.model_id, response).await
    }

    fn provider_name(&self) -> String {
        "claude".to_string()
    }
}
