//! Subcommands and the helpers they share.

pub mod compare;
pub mod config;
pub mod extract;
pub mod heuristic;
pub mod validate;

use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use async_trait::async_trait;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use stcheck_core::models::StcheckConfig;
use stcheck_core::pdf::PdfTextReader;
use stcheck_core::{DocumentAnalyzer, ValidationVerdict};
use stcheck_model::{CompletionRequest, ExtractionModel, ModelError, OpenAiBackend, OpenAiConfig};

/// Exit code for a MISMATCH verdict.
const MISMATCH_EXIT: u8 = 2;

/// Output format for verdicts.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum VerdictFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

/// Load the config from `path`, else the default location, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<StcheckConfig> {
    if let Some(path) = path {
        return Ok(StcheckConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(StcheckConfig::from_file(&default_path)?)
    } else {
        Ok(StcheckConfig::default())
    }
}

/// Read document text: PDFs through their text layer, anything else as UTF-8.
pub fn read_document(path: &Path, config: &StcheckConfig) -> anyhow::Result<String> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let text = if extension == "pdf" {
        let data = fs::read(path)?;
        PdfTextReader::from_config(&config.pdf).read_text(&data)?
    } else {
        fs::read_to_string(path)?
    };

    debug!("Read {} chars from {}", text.chars().count(), path.display());
    Ok(text)
}

/// Read a JSON file.
pub fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid JSON in {}: {}", path.display(), e))
}

/// Model call timeout: the flag when given, else the configured one.
pub fn resolve_timeout(flag_ms: Option<u64>, config: &StcheckConfig) -> Duration {
    flag_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.timeout())
}

/// Extraction model used by the CLI.
///
/// Without an API key the CLI still runs; any model call then fails with
/// [`ModelError::MissingApiKey`].
pub enum CliModel {
    OpenAi(OpenAiBackend),
    Offline { api_key_env: String },
}

impl CliModel {
    pub fn from_config(config: &StcheckConfig) -> anyhow::Result<Self> {
        let model = &config.model;
        match OpenAiConfig::from_env(&model.api_key_env) {
            Ok(openai) => {
                let openai = openai
                    .with_api_base(model.api_base.as_str())
                    .with_model(model.model.as_str());
                Ok(CliModel::OpenAi(OpenAiBackend::new(openai)?))
            }
            Err(_) => {
                debug!("{} not set, model calls disabled", model.api_key_env);
                Ok(CliModel::Offline {
                    api_key_env: model.api_key_env.clone(),
                })
            }
        }
    }
}

#[async_trait]
impl ExtractionModel for CliModel {
    async fn complete(&self, request: &CompletionRequest) -> stcheck_model::Result<String> {
        match self {
            CliModel::OpenAi(backend) => backend.complete(request).await,
            CliModel::Offline { api_key_env } => {
                warn!("Model call requested but {} is not set", api_key_env);
                Err(ModelError::MissingApiKey(api_key_env.clone()))
            }
        }
    }

    fn model_name(&self) -> &str {
        match self {
            CliModel::OpenAi(backend) => backend.model_name(),
            CliModel::Offline { .. } => "offline",
        }
    }
}

pub fn build_analyzer(config: &StcheckConfig) -> anyhow::Result<DocumentAnalyzer<CliModel>> {
    Ok(DocumentAnalyzer::from_config(CliModel::from_config(config)?, config))
}

/// Spinner on stderr while waiting for the model.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Print a verdict and map it to the process exit code.
pub fn report_verdict(verdict: &ValidationVerdict, format: VerdictFormat) -> anyhow::Result<ExitCode> {
    match format {
        VerdictFormat::Json => println!("{}", serde_json::to_string_pretty(verdict)?),
        VerdictFormat::Text => print_verdict_text(verdict),
    }

    if verdict.is_ok() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(MISMATCH_EXIT))
    }
}

fn print_verdict_text(verdict: &ValidationVerdict) {
    if verdict.is_ok() {
        println!("{} {}", style("✓").green(), style("OK").green().bold());
        return;
    }

    println!(
        "{} {} ({} discrepancies)",
        style("✗").red(),
        style("MISMATCH").red().bold(),
        verdict.errors().len()
    );
    for error in verdict.errors() {
        println!("  {} {}", style(&error.field).yellow(), error.description);
        if !error.invoice_value.is_empty() {
            println!("      invoice:     {}", error.invoice_value);
        }
        if !error.certificate_value.is_empty() {
            println!("      certificate: {}", error.certificate_value);
        }
    }
}
