use grader_core::{
    GradingMetadata, GradingRequest, GradingResult, build_grading_prompt, calculate_cost,
    parse_grading_response,
};
use grader_llm::{InvokeRequest, Message, ModelClient};
use std::sync::Arc;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::settings::Settings;

/// Sampling parameters after applying request overrides to the defaults
#[derive(Debug, Clone, PartialEq)]
struct Effective {
    model_id: String,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

/// Grades submissions: builds the prompt, calls the model, parses the
/// answer and attaches usage and cost.
#[derive(Clone)]
pub struct GradingEngine {
    client: Arc<dyn ModelClient>,
    settings: Arc<Settings>,
}

impl GradingEngine {
    pub fn new(client: Arc<dyn ModelClient>, settings: Arc<Settings>) -> Self {
        info!(
            "Initialized GradingEngine with {} client",
            client.provider_name()
        );
        Self { client, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Grade a single submission
    ///
    /// Every configuration problem (unknown prompt version, missing template,
    /// unknown model, incomplete defaults) is reported before the model is
    /// called. Model output that cannot be decoded is not an error: the
    /// result carries `parse_error` instead of a grade.
    pub async fn grade_submission(
        &self,
        request: &GradingRequest,
    ) -> EngineResult<GradingResult> {
        let effective = self.resolve(request)?;

        let system_prompt = self
            .settings
            .get_system_prompt(&request.system_prompt_version)?;
        let user_prompt = build_grading_prompt(request, &self.settings.prompts)?;
        let model_config = self.settings.get_model_config(&effective.model_id)?;

        info!(
            "Grading submission with model={}, system_prompt={}, temp={}",
            effective.model_id, request.system_prompt_version, effective.temperature
        );

        let invoke = InvokeRequest::new(
            effective.model_id.clone(),
            vec![Message::user(user_prompt)],
        )
        .with_system_prompt(system_prompt)
        .with_max_tokens(effective.max_tokens)
        .with_temperature(effective.temperature)
        .with_top_p(effective.top_p);

        let response = self.client.invoke(&invoke).await?;

        let total_tokens = response
            .input_tokens
            .checked_add(response.output_tokens)
            .ok_or(EngineError::TokenCountOverflow {
                input_tokens: response.input_tokens,
                output_tokens: response.output_tokens,
            })?;

        let fields = parse_grading_response(&response.response_text);

        let cost_usd = calculate_cost(
            &effective.model_id,
            response.input_tokens,
            response.output_tokens,
            model_config,
        )?;

        let metadata = GradingMetadata {
            model_id: effective.model_id,
            model_name: model_config.name.clone(),
            system_prompt_version: request.system_prompt_version.clone(),
            temperature: effective.temperature,
            max_tokens: effective.max_tokens,
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
            total_tokens,
            cost_usd,
            timestamp: response.timestamp,
        };

        let result = GradingResult::new(fields, metadata);

        info!(
            "Grading complete. Grade: {}/{}, Cost: ${:.4}",
            display_number(result.grade()),
            display_number(result.total_points()),
            cost_usd
        );

        Ok(result)
    }

    fn resolve(&self, request: &GradingRequest) -> EngineResult<Effective> {
        let defaults = self.settings.grading();

        let model_id = match &request.model_id {
            Some(model_id) => model_id.clone(),
            None => defaults.model()?.to_string(),
        };
        let temperature = match request.temperature {
            Some(temperature) => temperature,
            None => defaults.temperature()?,
        };
        let max_tokens = match request.max_tokens {
            Some(max_tokens) => max_tokens,
            None => defaults.max_tokens()?,
        };

        Ok(Effective {
            model_id,
            temperature,
            max_tokens,
            top_p: defaults.top_p(),
        })
    }
}

fn display_number(value: Option<f64>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}
