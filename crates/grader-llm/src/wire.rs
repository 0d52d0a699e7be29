//! Messages-API payloads shared by the Bedrock and Anthropic clients.

use chrono::Utc;
use reqwest::Response;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::traits::{InvocationResult, InvokeRequest, LlmError, Message, ShapeViolation};

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub messages: &'a [Message],
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
}

impl<'a> MessagesRequest<'a> {
    pub fn from_request(request: &'a InvokeRequest) -> Self {
        Self {
            anthropic_version: None,
            model: None,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            system: request.system(),
        }
    }
}

/// Turn an HTTP response into an invocation result
pub(crate) async fn read_response(
    model_id: &str,
    response: Response,
) -> Result<InvocationResult, LlmError> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        error!("Failed to invoke model {}: HTTP {}", model_id, status);

        return Err(match status.as_u16() {
            401 | 403 => LlmError::AuthError,
            429 => LlmError::RateLimitError,
            _ => LlmError::ApiError(format!("HTTP {}: {}", status, error_text)),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| LlmError::NetworkError(e.to_string()))?;

    extract_result(model_id, &body)
}

/// Validate a response body and pull out text and usage
///
/// The body must carry a non-empty `content` list whose first element has a
/// `text` field. Missing usage counts default to zero.
pub(crate) fn extract_result(model_id: &str, body: &str) -> Result<InvocationResult, LlmError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse response from model {}: {}", model_id, e);
        LlmError::ParseError(format!("{}. Response: {}", e, body))
    })?;

    let shape_error = |kind: ShapeViolation| {
        error!("Invalid response from model {}: {}", model_id, kind);
        LlmError::ResponseShape {
            model_id: model_id.to_string(),
            kind,
            payload: body.to_string(),
        }
    };

    let content = value
        .get("content")
        .ok_or_else(|| shape_error(ShapeViolation::MissingContent))?;

    let first = match content {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| shape_error(ShapeViolation::EmptyContent))?,
        Value::Null => return Err(shape_error(ShapeViolation::EmptyContent)),
        _ => return Err(shape_error(ShapeViolation::MissingText)),
    };

    let response_text = first
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| shape_error(ShapeViolation::MissingText))?
        .to_string();

    let usage = value.get("usage");
    let count = |field: &str| {
        usage
            .and_then(|u| u.get(field))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    };
    let input_tokens = count("input_tokens");
    let output_tokens = count("output_tokens");

    info!(
        "Model invocation successful. Input tokens: {}, Output tokens: {}",
        input_tokens, output_tokens
    );

    Ok(InvocationResult {
        response_text,
        input_tokens,
        output_tokens,
        model_id: model_id.to_string(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_kind(body: &str) -> ShapeViolation {
        match extract_result("m", body).unwrap_err() {
            LlmError::ResponseShape { kind, payload, .. } => {
                assert_eq!(payload, body);
                kind
            }
            other => panic!("Expected ResponseShape, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_text_and_usage() {
        let body = concat!(
            r#"{"content":[{"type":"text","text":"{\"grade\": 8}"}],"#,
            r#""usage":{"input_tokens":150,"output_tokens":42}}"#,
        );
        let result = extract_result("model-a", body).unwrap();

        assert_eq!(result.response_text, "{\"grade\": 8}");
        assert_eq!(result.input_tokens, 150);
        assert_eq!(result.output_tokens, 42);
        assert_eq!(result.model_id, "model-a");
    }

    #[test]
    fn test_missing_usage_defaults_to_zero() {
        let result = extract_result("m", r#"{"content":[{"text":"hi"}]}"#).unwrap();
        assert_eq!(result.input_tokens, 0);
        assert_eq!(result.output_tokens, 0);

        let body = r#"{"content":[{"text":"hi"}],"usage":{"output_tokens":7}}"#;
        let result = extract_result("m", body).unwrap();
        assert_eq!(result.input_tokens, 0);
        assert_eq!(result.output_tokens, 7);
    }

    #[test]
    fn test_shape_violations() {
        assert_eq!(
            shape_kind(r#"{"usage":{"input_tokens":1}}"#),
            ShapeViolation::MissingContent
        );
        assert_eq!(shape_kind(r#"{"content":[]}"#), ShapeViolation::EmptyContent);
        assert_eq!(
            shape_kind(r#"{"content":null}"#),
            ShapeViolation::EmptyContent
        );
        assert_eq!(
            shape_kind(r#"{"content":[{"type":"tool_use"}]}"#),
            ShapeViolation::MissingText
        );
    }

    #[test]
    fn test_non_json_body() {
        let err = extract_result("m", "<html>oops</html>").unwrap_err();
        match err {
            LlmError::ParseError(msg) => assert!(msg.contains("<html>oops</html>")),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_request_body_omits_absent_fields() {
        let request = InvokeRequest::new("m", vec![Message::user("Grade this")]);
        let body = MessagesRequest::from_request(&request);

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("system").is_none());
        assert!(json.get("model").is_none());
        assert!(json.get("anthropic_version").is_none());
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["top_p"], 1.0);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
