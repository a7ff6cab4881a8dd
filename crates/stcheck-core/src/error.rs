//! Error types for the stcheck-core library.

use thiserror::Error;

use crate::models::DocumentType;

/// Main error type for the stcheck library.
#[derive(Error, Debug)]
pub enum StcheckError {
    /// Document analysis error.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Response normalization error outside the analysis pipeline.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Broad class of an analysis failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input. Never worth retrying.
    Input,
    /// The extraction model failed or timed out.
    Upstream,
    /// The model answered with something that is not the expected JSON.
    Format,
}

/// Errors raised by the extraction orchestrator.
///
/// None of these are retried inside the core.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Document text is empty or whitespace.
    #[error("document text is empty")]
    EmptyText,

    /// Document type is not one of invoice, certificate, phytosanitary.
    #[error("unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    /// Timeout must be positive.
    #[error("timeout must be greater than zero")]
    InvalidTimeout,

    /// The model did not answer in time.
    #[error("extraction timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The model call itself failed (network, auth, rate limit).
    #[cfg(feature = "native")]
    #[error("extraction model failed: {0}")]
    Model(#[from] stcheck_model::ModelError),

    /// The model response could not be normalized.
    #[error("invalid {document} response format: {source}")]
    Format {
        document: DocumentType,
        #[source]
        source: FormatError,
    },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::EmptyText
            | AnalysisError::UnsupportedDocumentType(_)
            | AnalysisError::InvalidTimeout => ErrorKind::Input,
            AnalysisError::Timeout { .. } => ErrorKind::Upstream,
            #[cfg(feature = "native")]
            AnalysisError::Model(_) => ErrorKind::Upstream,
            AnalysisError::Format { .. } => ErrorKind::Format,
        }
    }

    /// Stable machine-readable reason tag.
    pub fn reason(&self) -> &'static str {
        match self {
            AnalysisError::EmptyText => "empty_text",
            AnalysisError::UnsupportedDocumentType(_) => "unsupported_document_type",
            AnalysisError::InvalidTimeout => "invalid_timeout",
            AnalysisError::Timeout { .. } => "timeout",
            #[cfg(feature = "native")]
            AnalysisError::Model(_) => "service_error",
            AnalysisError::Format { .. } => "invalid_format",
        }
    }
}

/// Errors from the extraction response normalizer.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The model returned nothing.
    #[error("response is empty")]
    EmptyResponse,

    /// The response is not valid JSON after fence stripping.
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The top-level JSON value is not an object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF carries no usable text layer (scanned image).
    #[error("PDF has no text layer ({0} chars); OCR the document first")]
    NoTextLayer(usize),
}

/// Result type for the stcheck library.
pub type Result<T> = std::result::Result<T, StcheckError>;
