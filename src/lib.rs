//! Automated grading of student submissions with hosted LLMs.
//!
//! This crate re-exports the workspace members:
//! - [`grader_core`]: rubric, request, prompt building, response parsing and cost
//! - [`grader_llm`]: model clients (Bedrock, Anthropic API, mock)
//! - [`grader_engine`]: configuration loading and the grading orchestrator

pub use grader_core;
pub use grader_engine;
pub use grader_llm;

pub use grader_engine::{GradingEngine, Settings};
