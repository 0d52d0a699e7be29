use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Incomplete configuration: {0}")]
    ConfigIncomplete(String),

    #[error("Model '{0}' not found in configuration")]
    ModelNotFound(String),

    #[error("Prompt version '{version}' not found. Available: {available:?}")]
    PromptVersionNotFound {
        version: String,
        available: Vec<String>,
    },

    #[error("Template '{name}' not found. Available: {available:?}")]
    TemplateNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Template format error: {0}")]
    TemplateFormat(String),

    #[error("Missing cost configuration for model '{model_id}': {field}")]
    MissingCostConfig { model_id: String, field: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
