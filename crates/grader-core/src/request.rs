use serde::{Deserialize, Serialize};

use crate::rubric::Rubric;

/// System prompt version used when a request does not name one
pub const DEFAULT_PROMPT_VERSION: &str = "v1_basic";

fn default_prompt_version() -> String {
    DEFAULT_PROMPT_VERSION.to_string()
}

/// A single submission to be graded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRequest {
    /// Assignment question text
    pub question: String,

    /// Rubric the answer is graded against
    pub rubric: Rubric,

    /// The student's answer
    pub student_response: String,

    /// Key into the configured system prompts (e.g. "v1_basic", "v2_strict")
    #[serde(default = "default_prompt_version")]
    pub system_prompt_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_context: Option<String>,

    /// Overrides for the configured grading defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GradingRequest {
    /// Create a request with the default prompt version and no overrides
    pub fn new(
        question: impl Into<String>,
        rubric: Rubric,
        student_response: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            rubric,
            student_response: student_response.into(),
            system_prompt_version: default_prompt_version(),
            additional_context: None,
            course_context: None,
            model_id: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_prompt_version(mut self, version: impl Into<String>) -> Self {
        self.system_prompt_version = version.into();
        self
    }

    pub fn with_additional_context(mut self, context: impl Into<String>) -> Self {
        self.additional_context = Some(context.into());
        self
    }

    pub fn with_course_context(mut self, context: impl Into<String>) -> Self {
        self.course_context = Some(context.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Whether the context-aware template should be used
    pub fn has_context(&self) -> bool {
        let non_empty = |c: &Option<String>| c.as_deref().is_some_and(|s| !s.is_empty());
        non_empty(&self.course_context) || non_empty(&self.additional_context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::Criterion;

    fn rubric() -> Rubric {
        Rubric::new(10.0, vec![Criterion::new("Accuracy", 10.0, "Correct")])
    }

    #[test]
    fn test_new_uses_default_prompt_version() {
        let request = GradingRequest::new("Q", rubric(), "A");
        assert_eq!(request.system_prompt_version, "v1_basic");
        assert!(request.model_id.is_none());
        assert!(!request.has_context());
    }

    #[test]
    fn test_has_context_ignores_empty_strings() {
        let request = GradingRequest::new("Q", rubric(), "A")
            .with_course_context("")
            .with_additional_context("");
        assert!(!request.has_context());

        let request = GradingRequest::new("Q", rubric(), "A").with_course_context("CS 101");
        assert!(request.has_context());

        let request = GradingRequest::new("Q", rubric(), "A").with_additional_context("late");
        assert!(request.has_context());
    }

    #[test]
    fn test_deserialization_defaults() {
        let json = r#"{
            "question": "What is ownership?",
            "rubric": {"total_points": 10, "criteria": []},
            "student_response": "Each value has one owner."
        }"#;

        let request: GradingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.system_prompt_version, DEFAULT_PROMPT_VERSION);
        assert!(request.course_context.is_none());
        assert!(request.temperature.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let request = GradingRequest::new("Q", rubric(), "A")
            .with_prompt_version("v2_strict")
            .with_model("anthropic.claude-3-haiku-20240307-v1:0")
            .with_temperature(0.5)
            .with_max_tokens(512);

        assert_eq!(request.system_prompt_version, "v2_strict");
        assert_eq!(
            request.model_id.as_deref(),
            Some("anthropic.claude-3-haiku-20240307-v1:0")
        );
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.max_tokens, Some(512));
    }
}
