use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grader_core::{GradingRequest, GradingResult, ModelConfig};
use grader_engine::{ConfigLoader, DEFAULT_CONFIG_DIR, GradingEngine};
use grader_llm::create_client;
use serde::Deserialize;
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "llm-grader")]
#[command(about = "Grade student submissions against a rubric with a hosted LLM")]
#[command(version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one submission file
    Grade {
        /// Path to the submission JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory holding config.* and prompts.*
        #[arg(short, long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,

        /// System prompt version (overrides the submission file)
        #[arg(short, long)]
        prompt_version: Option<String>,

        /// Model id (overrides the configured default)
        #[arg(short, long)]
        model: Option<String>,

        #[arg(short, long)]
        temperature: Option<f64>,

        #[arg(long)]
        max_tokens: Option<u32>,

        /// Write the full result as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List configured models and their rates
    Models {
        #[arg(short, long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,
    },
}

/// Submission file schema
#[derive(Debug, Deserialize)]
struct Submission {
    #[serde(default)]
    assignment_id: Option<String>,
    #[serde(flatten)]
    request: GradingRequest,
}

/// Command line overrides applied on top of the submission file
#[derive(Debug, Default)]
struct Overrides {
    prompt_version: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

impl Overrides {
    fn apply(self, mut request: GradingRequest) -> GradingRequest {
        if let Some(version) = self.prompt_version {
            request.system_prompt_version = version;
        }
        if let Some(model) = self.model {
            request.model_id = Some(model);
        }
        if let Some(temperature) = self.temperature {
            request.temperature = Some(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request.max_tokens = Some(max_tokens);
        }
        request
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Grade {
            input,
            config_dir,
            prompt_version,
            model,
            temperature,
            max_tokens,
            output,
        } => {
            let overrides = Overrides {
                prompt_version,
                model,
                temperature,
                max_tokens,
            };
            grade_command(&input, &config_dir, overrides, output.as_deref()).await?;
        }
        Commands::Models { config_dir } => {
            models_command(&config_dir)?;
        }
    }

    Ok(())
}

async fn grade_command(
    input_path: &Path,
    config_dir: &Path,
    overrides: Overrides,
    output_path: Option<&Path>,
) -> Result<()> {
    let submission = read_submission(input_path)?;
    if let Some(assignment_id) = &submission.assignment_id {
        info!("Grading assignment {}", assignment_id);
    }
    let request = overrides.apply(submission.request);

    let settings = ConfigLoader::new(config_dir)
        .load()
        .context("Failed to load grader configuration")?;
    let client = create_client(settings.llm()).context("Failed to create model client")?;
    let engine = GradingEngine::new(client, Arc::new(settings));

    let result = engine
        .grade_submission(&request)
        .await
        .context("Grading failed")?;

    let summary = format_summary(&result).context("Failed to format result summary")?;
    print!("{}", summary);

    if let Some(path) = output_path {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write result file: {:?}", path))?;
        println!("Results saved to: {}", path.display());
    }

    Ok(())
}

fn models_command(config_dir: &Path) -> Result<()> {
    let config = ConfigLoader::new(config_dir)
        .load_config()
        .context("Failed to load grader configuration")?;

    let default_model = config.grading.default_model.as_deref();
    for model in &config.models {
        let marker = if Some(model.id.as_str()) == default_model {
            " (default)"
        } else {
            ""
        };
        println!("{}{}", format_model(model), marker);
    }

    Ok(())
}

fn read_submission(path: &Path) -> Result<Submission> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read submission file: {:?}", path))?;
    parse_submission(&json)
}

fn parse_submission(json: &str) -> Result<Submission> {
    serde_json::from_str(json).context("Failed to parse submission JSON")
}

fn format_summary(result: &GradingResult) -> Result<String, fmt::Error> {
    let meta = &result.metadata;
    let mut out = String::new();

    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "GRADING RESULT")?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(
        out,
        "Grade: {}/{}",
        number_or_na(result.grade()),
        number_or_na(result.total_points())
    )?;
    if let Some(error) = result.parse_error() {
        writeln!(out, "Parse error: {}", error)?;
    }
    writeln!(out, "\nFeedback:\n{}", result.feedback().unwrap_or("N/A"))?;

    write_list(&mut out, "Strengths", &result.strengths())?;
    write_list(&mut out, "Areas for Improvement", &result.improvements())?;

    writeln!(out, "\n{}", "-".repeat(60))?;
    writeln!(out, "Model: {} ({})", meta.model_name, meta.model_id)?;
    writeln!(out, "System prompt: {}", meta.system_prompt_version)?;
    writeln!(
        out,
        "Tokens: {} in / {} out / {} total",
        meta.input_tokens, meta.output_tokens, meta.total_tokens
    )?;
    writeln!(out, "Cost: ${:.6}", meta.cost_usd)?;

    Ok(out)
}

fn write_list(out: &mut String, title: &str, items: &[&str]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{}:", title)?;
    for item in items {
        writeln!(out, "  - {}", item)?;
    }
    Ok(())
}

fn format_model(model: &ModelConfig) -> String {
    let rate = |r: Option<f64>| r.map_or_else(|| "?".to_string(), |v| format!("${}", v));
    format!(
        "{}  {}  in {}/1k  out {}/1k",
        model.id,
        model.name,
        rate(model.cost_per_1k_input_tokens),
        rate(model.cost_per_1k_output_tokens)
    )
}

fn number_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}
