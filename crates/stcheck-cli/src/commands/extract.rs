//! Extract command - turn one document into a canonical record.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use console::style;
use tracing::info;

use stcheck_core::DocumentType;

use super::{build_analyzer, load_config, read_document, resolve_timeout, spinner};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (PDF with a text layer, or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Document type: invoice, certificate (st, st1) or phytosanitary (fito)
    #[arg(short = 't', long = "type")]
    document_type: DocumentType,

    /// Model call timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include product source, warnings and timing
    #[arg(long)]
    report: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path)?;
    let text = read_document(&args.input, &config)?;
    let timeout = resolve_timeout(args.timeout_ms, &config);
    let analyzer = build_analyzer(&config)?;

    info!("Extracting {} from {}", args.document_type, args.input.display());

    let pb = spinner(&format!("Extracting {}...", args.document_type));
    let result = analyzer
        .extract_with_report(&text, args.document_type, timeout)
        .await;
    pb.finish_and_clear();
    let report = result?;

    for warning in &report.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    let output = if args.report {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string_pretty(&report.record)?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(ExitCode::SUCCESS)
}
