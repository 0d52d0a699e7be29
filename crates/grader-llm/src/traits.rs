use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat message sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Parameters of one model invocation
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest {
    pub model_id: String,
    pub messages: Vec<Message>,
    pub system_prompt: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl InvokeRequest {
    /// Create a request with deterministic sampling defaults
    /// (`max_tokens = 1000`, `temperature = 0.0`, `top_p = 1.0`)
    pub fn new(model_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
            system_prompt: None,
            max_tokens: 1000,
            temperature: 0.0,
            top_p: 1.0,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    /// Check the input constraints shared by every client
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.messages.is_empty() {
            return Err(LlmError::InvalidRequest(
                "messages must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(LlmError::InvalidRequest(format!(
                "temperature must be in [0, 1], got {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(LlmError::InvalidRequest(format!(
                "top_p must be in [0, 1], got {}",
                self.top_p
            )));
        }
        if self.max_tokens == 0 {
            return Err(LlmError::InvalidRequest(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// System prompt to send, skipping empty strings
    pub fn system(&self) -> Option<&str> {
        self.system_prompt.as_deref().filter(|s| !s.is_empty())
    }
}

/// Output of a successful model invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub response_text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub model_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Text-generation client for a hosted model provider
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one request and return the generated text with token usage.
    ///
    /// No retries are performed.
    async fn invoke(&self, request: &InvokeRequest) -> Result<InvocationResult, LlmError>;

    /// Get the provider name (e.g., "bedrock", "claude", "mock")
    fn provider_name(&self) -> String;
}

/// Which part of the response body was malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeViolation {
    MissingContent,
    EmptyContent,
    MissingText,
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeViolation::MissingContent => write!(f, "missing 'content' field"),
            ShapeViolation::EmptyContent => write!(f, "'content' array is empty"),
            ShapeViolation::MissingText => write!(f, "missing 'text' field in content"),
        }
    }
}

/// Errors that can occur during model invocation
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Invalid API key or authentication failed")]
    AuthError,

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Invalid response from model {model_id}: {kind}. Response: {payload}")]
    ResponseShape {
        model_id: String,
        kind: ShapeViolation,
        payload: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Whether the failure came from the remote service or the transport
    pub fn is_remote_service(&self) -> bool {
        matches!(
            self,
            LlmError::ApiError(_)
                | LlmError::AuthError
                | LlmError::RateLimitError
                | LlmError::NetworkError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> InvokeRequest {
        InvokeRequest::new("model", vec![Message::user("Grade this")])
    }

    #[test]
    fn test_invoke_request_defaults() {
        let request = request();
        assert_eq!(request.max_tokens, 1000);
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.top_p, 1.0);
        assert!(request.system_prompt.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_messages() {
        let request = InvokeRequest::new("model", vec![]);
        assert!(matches!(
            request.validate(),
            Err(LlmError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_sampling() {
        assert!(request().with_temperature(1.5).validate().is_err());
        assert!(request().with_temperature(-0.1).validate().is_err());
        assert!(request().with_top_p(2.0).validate().is_err());
        assert!(request().with_temperature(1.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max_tokens() {
        let err = request().with_max_tokens(0).validate().unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn test_empty_system_prompt_is_skipped() {
        assert_eq!(request().with_system_prompt("").system(), None);
        assert_eq!(
            request().with_system_prompt("Be fair").system(),
            Some("Be fair")
        );
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn test_error_remote_classification() {
        assert!(LlmError::AuthError.is_remote_service());
        assert!(LlmError::NetworkError("reset".into()).is_remote_service());
        assert!(!LlmError::InvalidRequest("x".into()).is_remote_service());

        let shape = LlmError::ResponseShape {
            model_id: "m".into(),
            kind: ShapeViolation::EmptyContent,
            payload: r#"{"content":[]}"#.into(),
        };
        assert!(!shape.is_remote_service());
        assert!(shape.to_string().contains(r#"{"content":[]}"#));
        assert!(shape.to_string().contains("'content' array is empty"));
    }
}
