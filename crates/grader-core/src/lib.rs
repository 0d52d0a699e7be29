pub mod config;
pub mod cost;
pub mod error;
pub mod prompt;
pub mod request;
pub mod result;
pub mod rubric;

// Re-export commonly used types
pub use config::{
    CONTEXT_TEMPLATE, GradingDefaults, ModelConfig, PromptLibrary, STANDARD_TEMPLATE, find_model,
};
pub use cost::calculate_cost;
pub use error::{CoreError, CoreResult};
pub use prompt::{build_grading_prompt, fill_template, json_format_instructions};
pub use request::{DEFAULT_PROMPT_VERSION, GradingRequest};
pub use result::{
    GradingFields, GradingMetadata, GradingResult, NO_JSON_FOUND, parse_grading_response,
};
pub use rubric::{Criterion, Rubric};
