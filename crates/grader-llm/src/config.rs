use serde::{Deserialize, Serialize};

/// Model provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    Bedrock {
        /// Falls back to `AWS_REGION`, then us-east-1
        #[serde(default, skip_serializing_if = "Option::is_none")]
        region: Option<String>,
        /// Bedrock API key; falls back to `AWS_BEARER_TOKEN_BEDROCK`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },
    Claude {
        /// Falls back to `ANTHROPIC_API_KEY`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    Mock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_text: Option<String>,
        #[serde(default)]
        input_tokens: u64,
        #[serde(default)]
        output_tokens: u64,
    },
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig::Bedrock {
            region: None,
            api_key: None,
            endpoint: None,
        }
    }
}
