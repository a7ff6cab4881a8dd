//! Heuristic command - recover product rows from raw invoice text.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use stcheck_core::heuristics::ProductScanner;
use stcheck_core::text::normalize_text;
use stcheck_core::{ExtractionMatch, Product};

use super::{load_config, read_document};

/// Arguments for the heuristic command.
#[derive(Args)]
pub struct HeuristicArgs {
    /// Invoice file (PDF with a text layer, or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// One CSV row per recovered product.
#[derive(Serialize)]
struct ProductRow<'a> {
    name: &'a str,
    package_count: Option<f64>,
    gross_weight: Option<f64>,
    net_weight: Option<f64>,
    confidence: f32,
}

pub fn run(args: HeuristicArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path)?;
    let text = read_document(&args.input, &config)?;

    let scanner = ProductScanner::from_config(&config.heuristics);
    let (strategy, matches) = match scanner.scan(&normalize_text(&text)) {
        Some((strategy, matches)) => (Some(strategy), matches),
        None => (None, Vec::new()),
    };

    info!("Recovered {} products", matches.len());

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matches)?),
        OutputFormat::Csv => print!("{}", format_csv(&matches)?),
        OutputFormat::Text => {
            match strategy {
                Some(strategy) => println!(
                    "{} {} products via {} strategy",
                    style("✓").green(),
                    matches.len(),
                    strategy
                ),
                None => println!("{} No products found", style("✗").red()),
            }
            for m in &matches {
                println!(
                    "  {:<40} packages={} gross={} net={} ({:.0}%)",
                    m.value.name,
                    show(m.value.package_count),
                    show(m.value.gross_weight),
                    show(m.value.net_weight),
                    m.confidence * 100.0
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn format_csv(matches: &[ExtractionMatch<Product>]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for m in matches {
        writer.serialize(ProductRow {
            name: &m.value.name,
            package_count: m.value.package_count,
            gross_weight: m.value.gross_weight,
            net_weight: m.value.net_weight,
            confidence: m.confidence,
        })?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("CSV error: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

fn show(value: Option<f64>) -> String {
    value.map(stcheck_core::validation::format_quantity).unwrap_or_else(|| "-".to_string())
}
