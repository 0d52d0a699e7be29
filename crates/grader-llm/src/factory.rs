use std::env;
use std::sync::Arc;
use tracing::info;

use crate::bedrock::{BedrockClient, DEFAULT_REGION};
use crate::claude::ClaudeClient;
use crate::config::LlmConfig;
use crate::mock::MockModelClient;
use crate::traits::{LlmError, ModelClient};

const BEDROCK_TOKEN_VAR: &str = "AWS_BEARER_TOKEN_BEDROCK";
const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Create a model client from configuration
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn ModelClient>, LlmError> {
    let client: Arc<dyn ModelClient> = match config {
        LlmConfig::Bedrock {
            region,
            api_key,
            endpoint,
        } => {
            let api_key = resolve_secret(api_key.as_deref(), BEDROCK_TOKEN_VAR)?;
            match endpoint {
                Some(url) => Arc::new(BedrockClient::with_endpoint(url.clone(), api_key)),
                None => {
                    let region = resolve_region(region.as_deref(), env::var("AWS_REGION").ok());
                    Arc::new(BedrockClient::new(&region, api_key))
                }
            }
        }
        LlmConfig::Claude { api_key, base_url } => {
            let api_key = resolve_secret(api_key.as_deref(), ANTHROPIC_KEY_VAR)?;
            match base_url {
                Some(url) => Arc::new(ClaudeClient::with_base_url(api_key, url.clone())),
                None => Arc::new(ClaudeClient::new(api_key)),
            }
        }
        LlmConfig::Mock {
            response_text,
            input_tokens,
            output_tokens,
        } => {
            let client = match response_text {
                Some(text) => MockModelClient::with_response(text.clone()),
                None => MockModelClient::new(),
            };
            Arc::new(client.with_usage(*input_tokens, *output_tokens))
        }
    };

    info!("Created {} model client", client.provider_name());
    Ok(client)
}

/// Pick the configured region, then the environment's, then the default
fn resolve_region(configured: Option<&str>, from_env: Option<String>) -> String {
    configured
        .map(str::to_string)
        .or(from_env.filter(|r| !r.is_empty()))
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

fn resolve_secret(configured: Option<&str>, var: &str) -> Result<String, LlmError> {
    if let Some(key) = configured.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    env::var(var)
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            LlmError::ConfigError(format!("No API key configured and {} is not set", var))
        })
}
