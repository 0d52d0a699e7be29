use config::{Config, Environment, File};
use grader_core::{CoreError, CoreResult, GradingDefaults, ModelConfig, PromptLibrary, find_model};
use grader_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory searched when no config directory is given
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Prefix for environment overrides of the main config
pub const ENV_PREFIX: &str = "GRADER";

const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// Main configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainConfig {
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub grading: GradingDefaults,
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Reads `config.*` and `prompts.*` from a directory
///
/// The file format follows the extension (TOML, YAML or JSON).
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            env_prefix: Some(ENV_PREFIX.to_string()),
        }
    }

    /// Ignore `GRADER_*` environment overrides
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load the main configuration
    ///
    /// Environment variables override file values, using double underscore
    /// for nesting:
    /// - GRADER_GRADING__DEFAULT_MODEL=anthropic.claude-3-haiku-20240307-v1:0
    /// - GRADER_LLM__REGION=us-west-2
    pub fn load_config(&self) -> CoreResult<MainConfig> {
        let path = self.find_document("config")?;

        let mut builder = Config::builder().add_source(File::from(path.as_path()));
        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config: MainConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoreError::ConfigInvalid(format!("{}: {}", path.display(), e)))?;

        info!(
            "Loaded config from {} ({} models)",
            path.display(),
            config.models.len()
        );
        Ok(config)
    }

    /// Load system prompts and grading templates
    pub fn load_prompts(&self) -> CoreResult<PromptLibrary> {
        let path = self.find_document("prompts")?;

        let prompts: PromptLibrary = Config::builder()
            .add_source(File::from(path.as_path()))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoreError::ConfigInvalid(format!("{}: {}", path.display(), e)))?;

        info!(
            "Loaded prompts from {} ({} system prompts, {} templates)",
            path.display(),
            prompts.system_prompts.len(),
            prompts.grading_templates.len()
        );
        Ok(prompts)
    }

    /// Load both documents
    pub fn load(&self) -> CoreResult<Settings> {
        Ok(Settings::new(self.load_config()?, self.load_prompts()?))
    }

    fn find_document(&self, stem: &str) -> CoreResult<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.config_dir.join(format!("{}.{}", stem, ext)))
            .find(|path| path.is_file())
            .ok_or_else(|| {
                let expected = self.config_dir.join(format!("{}.yaml", stem));
                CoreError::ConfigNotFound(expected.display().to_string())
            })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR)
    }
}

/// Loaded configuration, read-only after construction
///
/// Share it between graders with an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub config: MainConfig,
    pub prompts: PromptLibrary,
}

impl Settings {
    pub fn new(config: MainConfig, prompts: PromptLibrary) -> Self {
        Self { config, prompts }
    }

    /// Load settings from a config directory, honoring environment overrides
    pub fn load(config_dir: impl Into<PathBuf>) -> CoreResult<Self> {
        ConfigLoader::new(config_dir).load()
    }

    pub fn get_model_config(&self, model_id: &str) -> CoreResult<&ModelConfig> {
        find_model(&self.config.models, model_id)
    }

    pub fn get_system_prompt(&self, version: &str) -> CoreResult<&str> {
        self.prompts.system_prompt(version)
    }

    pub fn get_grading_template(&self, name: &str) -> CoreResult<&str> {
        self.prompts.grading_template(name)
    }

    pub fn models(&self) -> &[ModelConfig] {
        &self.config.models
    }

    pub fn grading(&self) -> &GradingDefaults {
        &self.config.grading
    }

    pub fn llm(&self) -> &LlmConfig {
        &self.config.llm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG_TOML: &str = r#"
[[models]]
id = "anthropic.claude-3-haiku-20240307-v1:0"
name = "Claude 3 Haiku"
cost_per_1k_input_tokens = 0.00025
cost_per_1k_output_tokens = 0.00125

[grading]
default_model = "anthropic.claude-3-haiku-20240307-v1:0"
temperature = 0.0
max_tokens = 1000

[llm]
provider = "mock"
"#;

    const PROMPTS_YAML: &str = r#"
system_prompts:
  v1_basic: "You are a fair teaching assistant."
  v2_strict: "You are a strict grader."
grading_templates:
  standard: "Question: {question}\nRubric: {rubric}\nAnswer: {student_response}"
"#;

    fn loader(dir: &TempDir) -> ConfigLoader {
        ConfigLoader::new(dir.path()).without_env()
    }

    fn config_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), CONFIG_TOML).unwrap();
        fs::write(dir.path().join("prompts.yaml"), PROMPTS_YAML).unwrap();
        dir
    }

    #[test]
    fn test_load_mixed_formats() {
        let dir = config_dir();
        let settings = loader(&dir).load().unwrap();

        assert_eq!(settings.models().len(), 1);
        assert_eq!(settings.grading().max_tokens, Some(1000));
        assert!(matches!(settings.llm(), LlmConfig::Mock { .. }));
        assert_eq!(
            settings.get_system_prompt("v2_strict").unwrap(),
            "You are a strict grader."
        );
        assert!(
            settings
                .get_grading_template("standard")
                .unwrap()
                .contains("{student_response}")
        );
    }

    #[test]
    fn test_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let err = loader(&dir).load_config().unwrap_err();

        match err {
            CoreError::ConfigNotFound(path) => assert!(path.contains("config")),
            other => panic!("Expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_prompts_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), CONFIG_TOML).unwrap();

        let err = loader(&dir).load().unwrap_err();
        match err {
            CoreError::ConfigNotFound(path) => assert!(path.contains("prompts")),
            other => panic!("Expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "models = \"not a list\"").unwrap();

        let err = loader(&dir).load_config().unwrap_err();
        assert!(matches!(err, CoreError::ConfigInvalid(_)));
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();

        let config = loader(&dir).load_config().unwrap();
        assert!(config.models.is_empty());
        assert_eq!(config.grading, GradingDefaults::default());
        assert_eq!(config.llm, LlmConfig::default());
    }

    #[test]
    fn test_model_lookup() {
        let dir = config_dir();
        let settings = loader(&dir).load().unwrap();

        let model = settings
            .get_model_config("anthropic.claude-3-haiku-20240307-v1:0")
            .unwrap();
        assert_eq!(model.name, "Claude 3 Haiku");
        assert_eq!(model.cost_per_1k_input_tokens, Some(0.00025));

        assert!(matches!(
            settings.get_model_config("unknown"),
            Err(CoreError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let dir = TempDir::new().unwrap();
        let config = concat!(
            "[grading]\ntemperature = 0.0\n\n",
            "[llm]\nprovider = \"bedrock\"\nregion = \"us-east-1\"\n",
        );
        fs::write(dir.path().join("config.toml"), config).unwrap();

        // SAFETY: no other test in this crate reads GRADER_* variables
        unsafe {
            std::env::set_var("GRADER_GRADING__TEMPERATURE", "0.2");
            std::env::set_var("GRADER_LLM__REGION", "us-west-2");
        }
        let loaded = ConfigLoader::new(dir.path()).load_config();
        unsafe {
            std::env::remove_var("GRADER_GRADING__TEMPERATURE");
            std::env::remove_var("GRADER_LLM__REGION");
        }

        let config = loaded.unwrap();
        assert_eq!(config.grading.temperature, Some(0.2));
        assert_eq!(
            config.llm,
            LlmConfig::Bedrock {
                region: Some("us-west-2".into()),
                api_key: None,
                endpoint: None,
            }
        );
    }
}
