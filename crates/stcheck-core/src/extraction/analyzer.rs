//! Extraction orchestrator: model call, response normalization, product
//! fallback and the two-document comparison.

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use stcheck_model::{CompletionRequest, ExtractionModel};
use tracing::{debug, info, warn};

use super::normalize::{normalize_response, normalize_value};
use super::prompts::{PromptTemplates, SYSTEM_INSTRUCTION};
use crate::error::{AnalysisError, FormatError};
use crate::heuristics::{ProductScanner, Strategy};
use crate::models::{
    CanonicalRecord, CertificateRecord, DocumentType, InvoiceRecord, StcheckConfig,
    ValidationVerdict,
};
use crate::text::normalize_text;
use crate::validation::RuleEngine;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Where the products of an extracted record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSource {
    /// The model response.
    Model,
    /// The heuristic line extractor, after the model returned none.
    Heuristic(Strategy),
    /// Nothing found anywhere.
    Missing,
}

/// Result of a single extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Canonical record.
    pub record: CanonicalRecord,
    /// Origin of the product list.
    pub product_source: ProductSource,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Input for [`DocumentAnalyzer::compare_invoice_and_certificate`].
///
/// A record given here is used instead of calling the model for that side.
#[derive(Debug, Clone, Default)]
pub struct CompareRequest {
    pub invoice_text: String,
    pub certificate_text: String,
    pub invoice_record: Option<Value>,
    pub certificate_record: Option<Value>,
    /// Per-call model timeout; the analyzer default when `None`.
    pub timeout: Option<Duration>,
}

impl CompareRequest {
    pub fn new(invoice_text: impl Into<String>, certificate_text: impl Into<String>) -> Self {
        Self {
            invoice_text: invoice_text.into(),
            certificate_text: certificate_text.into(),
            ..Self::default()
        }
    }

    pub fn with_invoice_record(mut self, record: Value) -> Self {
        self.invoice_record = Some(record);
        self
    }

    pub fn with_certificate_record(mut self, record: Value) -> Self {
        self.certificate_record = Some(record);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Drives document extraction and comparison.
///
/// Holds no per-call state, so one analyzer can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct DocumentAnalyzer<M> {
    model: M,
    prompts: PromptTemplates,
    scanner: ProductScanner,
    rules: RuleEngine,
    temperature: f32,
    default_timeout: Duration,
}

impl<M: ExtractionModel> DocumentAnalyzer<M> {
    /// Create an analyzer with built-in prompts and defaults.
    pub fn new(model: M) -> Self {
        Self {
            model,
            prompts: PromptTemplates::default(),
            scanner: ProductScanner::new(),
            rules: RuleEngine::new(),
            temperature: DEFAULT_TEMPERATURE,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create an analyzer configured from `config`.
    pub fn from_config(model: M, config: &StcheckConfig) -> Self {
        Self {
            model,
            prompts: PromptTemplates::from_config(&config.extraction),
            scanner: ProductScanner::from_config(&config.heuristics),
            rules: RuleEngine::from_config(&config.validation),
            temperature: config.model.temperature,
            default_timeout: config.timeout(),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptTemplates) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_scanner(mut self, scanner: ProductScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Extract a canonical record from document text.
    pub async fn extract(
        &self,
        text: &str,
        document: DocumentType,
        timeout: Duration,
    ) -> Result<CanonicalRecord, AnalysisError> {
        Ok(self.extract_with_report(text, document, timeout).await?.record)
    }

    /// Extract a canonical record and report how it was obtained.
    pub async fn extract_with_report(
        &self,
        text: &str,
        document: DocumentType,
        timeout: Duration,
    ) -> Result<ExtractionReport, AnalysisError> {
        let start = Instant::now();

        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }
        if timeout.is_zero() {
            return Err(AnalysisError::InvalidTimeout);
        }

        info!(
            "Analyzing {} document ({} chars) with {}",
            document,
            text.chars().count(),
            self.model.model_name()
        );

        let response = match self.call_model(text, document, timeout).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "{} analysis failed after {}ms: {}",
                    document,
                    start.elapsed().as_millis(),
                    e
                );
                return Err(e);
            }
        };

        let record = normalize_response(&response, document)
            .map_err(|source| AnalysisError::Format { document, source })?;

        let mut warnings = Vec::new();
        let (record, product_source) = match record {
            CanonicalRecord::Invoice(mut invoice) => {
                let source = self.fill_invoice_products(&mut invoice, text, &mut warnings);
                (CanonicalRecord::Invoice(invoice), source)
            }
            CanonicalRecord::Certificate(certificate) => {
                let source = if certificate.products.is_empty() {
                    ProductSource::Missing
                } else {
                    ProductSource::Model
                };
                (CanonicalRecord::Certificate(certificate), source)
            }
            other => (other, ProductSource::Missing),
        };

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "{} analysis completed in {}ms ({} products)",
            document,
            processing_time_ms,
            record.products().len()
        );

        Ok(ExtractionReport {
            record,
            product_source,
            warnings,
            processing_time_ms,
        })
    }

    /// Extract both documents (unless supplied) and run the rule engine.
    pub async fn compare_invoice_and_certificate(
        &self,
        request: CompareRequest,
    ) -> Result<ValidationVerdict, AnalysisError> {
        let start = Instant::now();

        if request.invoice_text.trim().is_empty() || request.certificate_text.trim().is_empty() {
            return Err(AnalysisError::EmptyText);
        }
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        if timeout.is_zero() {
            return Err(AnalysisError::InvalidTimeout);
        }

        info!("Starting invoice / certificate comparison");

        let (invoice, certificate) = tokio::try_join!(
            self.resolve_invoice(&request.invoice_text, request.invoice_record.as_ref(), timeout),
            self.resolve_certificate(
                &request.certificate_text,
                request.certificate_record.as_ref(),
                timeout
            ),
        )?;

        let verdict = self.rules.validate(&invoice, &certificate);

        info!(
            "Comparison completed in {}ms (status: {}, errors: {})",
            start.elapsed().as_millis(),
            verdict.status().as_str(),
            verdict.errors().len()
        );

        Ok(verdict)
    }

    /// Send one request, racing it against `timeout`.
    ///
    /// When the timer wins the request future is dropped, which aborts the
    /// HTTP call.
    async fn call_model(
        &self,
        text: &str,
        document: DocumentType,
        timeout: Duration,
    ) -> Result<String, AnalysisError> {
        let request = CompletionRequest::new(SYSTEM_INSTRUCTION, self.prompts.prompt(document), text)
            .with_temperature(self.temperature);

        match tokio::time::timeout(timeout, self.model.complete(&request)).await {
            Ok(result) => {
                let response = result?;
                debug!("Model returned {} chars", response.len());
                Ok(response)
            }
            Err(_) => Err(AnalysisError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn resolve_invoice(
        &self,
        text: &str,
        supplied: Option<&Value>,
        timeout: Duration,
    ) -> Result<InvoiceRecord, AnalysisError> {
        match supplied {
            Some(value) => {
                debug!("Using supplied invoice record");
                let record = normalize_value(value.clone(), DocumentType::Invoice)
                    .map_err(|source| format_error(DocumentType::Invoice, source))?;
                let mut invoice = record.into_invoice().unwrap_or_default();
                let mut warnings = Vec::new();
                self.fill_invoice_products(&mut invoice, text, &mut warnings);
                Ok(invoice)
            }
            None => Ok(self
                .extract(text, DocumentType::Invoice, timeout)
                .await?
                .into_invoice()
                .unwrap_or_default()),
        }
    }

    async fn resolve_certificate(
        &self,
        text: &str,
        supplied: Option<&Value>,
        timeout: Duration,
    ) -> Result<CertificateRecord, AnalysisError> {
        let record = match supplied {
            Some(value) => {
                debug!("Using supplied certificate record");
                normalize_value(value.clone(), DocumentType::Certificate)
                    .map_err(|source| format_error(DocumentType::Certificate, source))?
            }
            None => self.extract(text, DocumentType::Certificate, timeout).await?,
        };
        Ok(record.into_certificate().unwrap_or_default())
    }

    /// Recover invoice products from raw text when the record has none.
    fn fill_invoice_products(
        &self,
        invoice: &mut InvoiceRecord,
        raw_text: &str,
        warnings: &mut Vec<String>,
    ) -> ProductSource {
        if !invoice.products.is_empty() {
            return ProductSource::Model;
        }

        debug!("Invoice record has no products, scanning text");
        match self.scanner.scan_with_last_resort(&normalize_text(raw_text)) {
            Some((strategy, matches)) => {
                let lowest = matches
                    .iter()
                    .map(|m| m.confidence)
                    .fold(f32::INFINITY, f32::min);
                info!(
                    "Recovered {} invoice products via {} strategy",
                    matches.len(),
                    strategy
                );
                warnings.push(format!(
                    "{} invoice products recovered from text via {} strategy (lowest confidence {:.1})",
                    matches.len(),
                    strategy,
                    lowest
                ));
                invoice.products = matches.into_iter().map(|m| m.value).collect();
                ProductSource::Heuristic(strategy)
            }
            None => {
                warn!("Invoice products could not be extracted from text");
                warnings.push("invoice products could not be extracted".to_string());
                ProductSource::Missing
            }
        }
    }
}

fn format_error(document: DocumentType, source: FormatError) -> AnalysisError {
    AnalysisError::Format { document, source }
}
