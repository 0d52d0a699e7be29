use grader_core::CoreError;
use grader_llm::LlmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Reported usage whose total does not fit in a `u64`
    #[error("Token usage out of range: {input_tokens} + {output_tokens}")]
    TokenCountOverflow {
        input_tokens: u64,
        output_tokens: u64,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;
