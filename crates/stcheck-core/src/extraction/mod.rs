//! Extraction stage: prompts, model orchestration and response normalization.

#[cfg(feature = "native")]
pub mod analyzer;
pub mod normalize;
pub mod prompts;

#[cfg(feature = "native")]
pub use analyzer::{CompareRequest, DocumentAnalyzer, ExtractionReport, ProductSource};
pub use normalize::{
    normalize_certificate_value, normalize_date, normalize_invoice_value,
    normalize_phytosanitary_value, normalize_response, normalize_value, strip_code_fence,
};
pub use prompts::{PromptTemplates, SYSTEM_INSTRUCTION};

pub use crate::error::FormatError;
