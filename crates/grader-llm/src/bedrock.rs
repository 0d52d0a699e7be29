use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::traits::{InvocationResult, InvokeRequest, LlmError, ModelClient};
use crate::wire::{MessagesRequest, read_response};

/// Protocol version tag Bedrock expects for Anthropic models
pub const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Region used when neither the config nor `AWS_REGION` names one
pub const DEFAULT_REGION: &str = "us-east-1";

/// AWS Bedrock runtime client for Anthropic models
///
/// Authenticates with a Bedrock API key sent as a bearer token.
#[derive(Debug, Clone)]
pub struct BedrockClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl BedrockClient {
    /// Create a client for the regional runtime endpoint
    pub fn new(region: &str, api_key: String) -> Self {
        Self::with_endpoint(
            format!("https://bedrock-runtime.{}.amazonaws.com", region),
            api_key,
        )
    }

    /// Create a client with a custom endpoint (for testing or VPC endpoints)
    pub fn with_endpoint(endpoint: String, api_key: String) -> Self {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!("Initialized BedrockClient for endpoint: {}", endpoint);
        Self {
            client: Client::new(),
            api_key,
            endpoint,
        }
    }

    fn invoke_url(&self, model_id: &str) -> String {
        format!(
            "{}/model/{}/invoke",
            self.endpoint,
            urlencoding::encode(model_id)
        )
    }
}

#[async_trait]
impl ModelClient for BedrockClient {
    async fn invoke(&self, request: &InvokeRequest) -> Result<InvocationResult, LlmError> {
        request.validate()?;

        let body = MessagesRequest {
            anthropic_version: Some(BEDROCK_ANTHROPIC_VERSION),
            ..MessagesRequest::from_request(request)
        };

        debug!(
            "Invoking model {} with {} messages",
            request.model_id,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.invoke_url(&request.model_id))
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        read_response(&request.model_id, response).await
    }

    fn provider_name(&self) -> String {
        "bedrock".to_string()
    }
}
