pub mod bedrock;
pub mod claude;
pub mod config;
pub mod factory;
pub mod mock;
pub mod traits;
mod wire;

// Re-export main types for convenience
pub use bedrock::BedrockClient;
pub use claude::ClaudeClient;
pub use config::LlmConfig;
pub use factory::create_client;
pub use grader_core::cost::calculate_cost;
pub use mock::MockModelClient;
pub use traits::{
    InvocationResult, InvokeRequest, LlmError, Message, ModelClient, Role, ShapeViolation,
};
