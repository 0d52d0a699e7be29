use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};

/// `parse_error` value when the model answer contains no JSON object
pub const NO_JSON_FOUND: &str = "No JSON found in response";

/// Grading fields decoded from model output
///
/// The decoded object is passed through as-is. The model's field types are
/// not validated; the typed accessors return `None` when a field is absent
/// or has an unexpected type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradingFields(pub Map<String, Value>);

impl GradingFields {
    /// Fields for an answer that could not be decoded
    pub fn unparsed(response_text: &str, parse_error: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("grade".into(), Value::Null);
        map.insert("total_points".into(), Value::Null);
        map.insert("feedback".into(), Value::String(response_text.to_string()));
        map.insert("strengths".into(), Value::Array(vec![]));
        map.insert("improvements".into(), Value::Array(vec![]));
        map.insert("parse_error".into(), Value::String(parse_error.into()));
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn grade(&self) -> Option<f64> {
        self.0.get("grade").and_then(Value::as_f64)
    }

    pub fn total_points(&self) -> Option<f64> {
        self.0.get("total_points").and_then(Value::as_f64)
    }

    pub fn feedback(&self) -> Option<&str> {
        self.0.get("feedback").and_then(Value::as_str)
    }

    pub fn strengths(&self) -> Vec<&str> {
        string_list(self.0.get("strengths"))
    }

    pub fn improvements(&self) -> Vec<&str> {
        string_list(self.0.get("improvements"))
    }

    pub fn parse_error(&self) -> Option<&str> {
        self.0.get("parse_error").and_then(Value::as_str)
    }
}

fn string_list(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Extract grading fields from raw model output
///
/// Takes the span from the first `{` to the last `}` (or to the end of the
/// text when there is no `}` at all) and decodes it as a JSON object.
/// Surrounding prose is tolerated. Braces are not depth-matched, so
/// several objects in one answer, or a stray `}` after the real closing
/// brace, make decoding fail. A failure never produces a grade: the result
/// carries `parse_error` and the raw text as feedback.
pub fn parse_grading_response(response_text: &str) -> GradingFields {
    let start = response_text.find('{');
    let end = response_text.rfind('}');

    let json_text = match (start, end) {
        (Some(start), Some(end)) if end > start => &response_text[start..=end],
        // Unterminated object: let the decoder report what is wrong with it
        (Some(start), None) => &response_text[start..],
        _ => {
            warn!("No JSON found in response, returning raw text");
            return GradingFields::unparsed(response_text, NO_JSON_FOUND);
        }
    };

    match serde_json::from_str::<Map<String, Value>>(json_text) {
        Ok(fields) => GradingFields(fields),
        Err(e) => {
            error!("Failed to parse JSON response: {}", e);
            GradingFields::unparsed(response_text, format!("JSON decode error: {}", e))
        }
    }
}

/// Usage and cost details attached to every grading result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingMetadata {
    pub model_id: String,
    pub model_name: String,
    pub system_prompt_version: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cost_usd: f64,
    pub timestamp: DateTime<Utc>,
}

/// Result of grading one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    #[serde(flatten)]
    pub fields: GradingFields,
    pub metadata: GradingMetadata,
}

impl GradingResult {
    /// Combine decoded fields with metadata. A `metadata` key produced by the
    /// model is discarded.
    pub fn new(mut fields: GradingFields, metadata: GradingMetadata) -> Self {
        fields.0.remove("metadata");
        Self { fields, metadata }
    }

    pub fn grade(&self) -> Option<f64> {
        self.fields.grade()
    }

    pub fn total_points(&self) -> Option<f64> {
        self.fields.total_points()
    }

    pub fn feedback(&self) -> Option<&str> {
        self.fields.feedback()
    }

    pub fn strengths(&self) -> Vec<&str> {
        self.fields.strengths()
    }

    pub fn improvements(&self) -> Vec<&str> {
        self.fields.improvements()
    }

    pub fn parse_error(&self) -> Option<&str> {
        self.fields.parse_error()
    }
}
