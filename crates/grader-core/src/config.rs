use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};

/// Template used when the request carries no context
pub const STANDARD_TEMPLATE: &str = "standard";

/// Template used when course or additional context is present
pub const CONTEXT_TEMPLATE: &str = "with_context";

/// A model the grader is allowed to call, with its pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider model identifier (e.g. "anthropic.claude-3-5-sonnet-20241022-v2:0")
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// USD per 1000 input tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_1k_input_tokens: Option<f64>,

    /// USD per 1000 output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_1k_output_tokens: Option<f64>,
}

impl ModelConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cost_per_1k_input_tokens: f64,
        cost_per_1k_output_tokens: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost_per_1k_input_tokens: Some(cost_per_1k_input_tokens),
            cost_per_1k_output_tokens: Some(cost_per_1k_output_tokens),
        }
    }
}

/// Look up a model by id
pub fn find_model<'a>(models: &'a [ModelConfig], model_id: &str) -> CoreResult<&'a ModelConfig> {
    models
        .iter()
        .find(|m| m.id == model_id)
        .ok_or_else(|| CoreError::ModelNotFound(model_id.to_string()))
}

/// Default sampling parameters for grading calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradingDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl GradingDefaults {
    pub fn model(&self) -> CoreResult<&str> {
        self.default_model
            .as_deref()
            .ok_or_else(|| CoreError::ConfigIncomplete("grading.default_model is not set".into()))
    }

    pub fn temperature(&self) -> CoreResult<f64> {
        self.temperature
            .ok_or_else(|| CoreError::ConfigIncomplete("grading.temperature is not set".into()))
    }

    pub fn max_tokens(&self) -> CoreResult<u32> {
        self.max_tokens
            .ok_or_else(|| CoreError::ConfigIncomplete("grading.max_tokens is not set".into()))
    }

    /// Nucleus sampling falls back to 1.0 (disabled) when not configured
    pub fn top_p(&self) -> f64 {
        self.top_p.unwrap_or(1.0)
    }
}

/// System prompt variants and grading templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptLibrary {
    #[serde(default)]
    pub system_prompts: BTreeMap<String, String>,
    #[serde(default)]
    pub grading_templates: BTreeMap<String, String>,
}

impl PromptLibrary {
    pub fn system_prompt(&self, version: &str) -> CoreResult<&str> {
        self.system_prompts
            .get(version)
            .map(String::as_str)
            .ok_or_else(|| CoreError::PromptVersionNotFound {
                version: version.to_string(),
                available: self.system_prompts.keys().cloned().collect(),
            })
    }

    pub fn grading_template(&self, name: &str) -> CoreResult<&str> {
        self.grading_templates
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| CoreError::TemplateNotFound {
                name: name.to_string(),
                available: self.grading_templates.keys().cloned().collect(),
            })
    }
}
