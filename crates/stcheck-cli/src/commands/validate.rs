//! Validate command - cross-check two canonical records without a model.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use tracing::info;

use stcheck_core::extraction::{normalize_certificate_value, normalize_invoice_value};
use stcheck_core::RuleEngine;

use super::{load_config, read_json, report_verdict, VerdictFormat};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Invoice record (JSON)
    #[arg(required = true)]
    invoice: PathBuf,

    /// Certificate record (JSON)
    #[arg(required = true)]
    certificate: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: VerdictFormat,
}

pub fn run(args: ValidateArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path)?;

    let invoice = normalize_invoice_value(read_json(&args.invoice)?)
        .map_err(|e| anyhow::anyhow!("Invalid invoice record: {}", e))?;
    let certificate = normalize_certificate_value(read_json(&args.certificate)?)
        .map_err(|e| anyhow::anyhow!("Invalid certificate record: {}", e))?;

    info!(
        "Validating {} invoice products against {} certificate products",
        invoice.products.len(),
        certificate.products.len()
    );

    let verdict = RuleEngine::from_config(&config.validation).validate(&invoice, &certificate);
    report_verdict(&verdict, args.format)
}
