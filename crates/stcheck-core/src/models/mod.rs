//! Data models shared by the extraction and validation stages.

pub mod config;
pub mod record;
pub mod verdict;

pub use config::{
    ExtractionConfig, HeuristicsConfig, ModelConfig, PdfConfig, StcheckConfig, ValidationConfig,
};
pub use record::{
    CanonicalRecord, CertificateRecord, DocumentType, InvoiceRecord, PhytosanitaryRecord, Product,
};
pub use verdict::{Discrepancy, ValidationStatus, ValidationVerdict};
