use tracing::debug;

use crate::config::ModelConfig;
use crate::error::{CoreError, CoreResult};

/// Calculate the USD cost of a model invocation
///
/// This is a pure function: `(input / 1000) * input_rate + (output / 1000) * output_rate`.
///
/// # Examples
///
/// ```
/// use grader_core::config::ModelConfig;
/// use grader_core::cost::calculate_cost;
///
/// let model = ModelConfig::new("m", "Model", 0.003, 0.015);
/// let cost = calculate_cost("m", 1000, 1000, &model).unwrap();
/// assert!((cost - 0.018).abs() < 1e-12);
/// ```
pub fn calculate_cost(
    model_id: &str,
    input_tokens: u64,
    output_tokens: u64,
    cost_config: &ModelConfig,
) -> CoreResult<f64> {
    let input_rate = rate(
        model_id,
        "cost_per_1k_input_tokens",
        cost_config.cost_per_1k_input_tokens,
    )?;
    let output_rate = rate(
        model_id,
        "cost_per_1k_output_tokens",
        cost_config.cost_per_1k_output_tokens,
    )?;

    let input_cost = (input_tokens as f64 / 1000.0) * input_rate;
    let output_cost = (output_tokens as f64 / 1000.0) * output_rate;
    let total_cost = input_cost + output_cost;

    debug!(
        "Cost calculation for {}: ${:.6} (input) + ${:.6} (output) = ${:.6}",
        model_id, input_cost, output_cost, total_cost
    );

    Ok(total_cost)
}

fn rate(model_id: &str, field: &str, value: Option<f64>) -> CoreResult<f64> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(CoreError::MissingCostConfig {
            model_id: model_id.to_string(),
            field: format!("{} must be a non-negative number, got {}", field, v),
        }),
        None => Err(CoreError::MissingCostConfig {
            model_id: model_id.to_string(),
            field: field.to_string(),
        }),
    }
}
