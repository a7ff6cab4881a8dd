//! Core library for invoice / certificate-of-origin reconciliation.
//!
//! This crate provides:
//! - Text normalization for noisy extracted document text
//! - Heuristic recovery of product rows from raw invoice text
//! - Normalization of extraction-model responses into canonical records
//! - The extraction orchestrator (model call with timeout, product fallback)
//! - The deterministic customs rule engine (invoice vs ST-1)
//! - PDF text-layer reading

pub mod error;
pub mod extraction;
pub mod heuristics;
pub mod models;
#[cfg(feature = "native")]
pub mod pdf;
pub mod text;
pub mod validation;

pub use error::{AnalysisError, ErrorKind, FormatError, PdfError, Result, StcheckError};
pub use extraction::{normalize_response, normalize_value, PromptTemplates};
#[cfg(feature = "native")]
pub use extraction::{CompareRequest, DocumentAnalyzer, ExtractionReport, ProductSource};
pub use heuristics::{
    extract_product_matches, extract_products_from_text, ExtractionMatch, LineExtractor,
    NumericAssignment, ProductScanner, TrailingWeights,
};
pub use models::{
    CanonicalRecord, CertificateRecord, Discrepancy, DocumentType, InvoiceRecord,
    PhytosanitaryRecord, Product, StcheckConfig, ValidationStatus, ValidationVerdict,
};
#[cfg(feature = "native")]
pub use pdf::{PdfTextReader, PdfTextSource};
pub use text::normalize_text;
pub use validation::{validate, CompanyNameNormalizer, KeywordCompanyNormalizer, RuleEngine};

/// Re-export model types.
#[cfg(feature = "native")]
pub use stcheck_model::{ExtractionModel, ModelError, OpenAiBackend, OpenAiConfig};
