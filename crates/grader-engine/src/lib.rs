pub mod engine;
pub mod error;
pub mod settings;

pub use engine::GradingEngine;
pub use error::{EngineError, EngineResult};
pub use settings::{ConfigLoader, DEFAULT_CONFIG_DIR, ENV_PREFIX, MainConfig, Settings};
