//! Compare command - extract an invoice and a certificate and cross-check them.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use tracing::info;

use stcheck_core::CompareRequest;

use super::{
    build_analyzer, load_config, read_document, read_json, report_verdict, resolve_timeout,
    spinner, VerdictFormat,
};

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// Invoice file (PDF with a text layer, or plain text)
    #[arg(required = true)]
    invoice: PathBuf,

    /// Certificate of origin file (PDF with a text layer, or plain text)
    #[arg(required = true)]
    certificate: PathBuf,

    /// Already-extracted invoice record; skips the model for the invoice
    #[arg(long)]
    invoice_json: Option<PathBuf>,

    /// Already-extracted certificate record; skips the model for the certificate
    #[arg(long)]
    certificate_json: Option<PathBuf>,

    /// Model call timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: VerdictFormat,
}

pub async fn run(args: CompareArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let config = load_config(config_path)?;

    let mut request = CompareRequest::new(
        read_document(&args.invoice, &config)?,
        read_document(&args.certificate, &config)?,
    )
    .with_timeout(resolve_timeout(args.timeout_ms, &config));

    if let Some(path) = &args.invoice_json {
        request = request.with_invoice_record(read_json(path)?);
    }
    if let Some(path) = &args.certificate_json {
        request = request.with_certificate_record(read_json(path)?);
    }

    info!(
        "Comparing {} against {}",
        args.invoice.display(),
        args.certificate.display()
    );

    let analyzer = build_analyzer(&config)?;
    let pb = spinner("Comparing documents...");
    let result = analyzer.compare_invoice_and_certificate(request).await;
    pb.finish_and_clear();

    report_verdict(&result?, args.format)
}
