//! PDF text-layer reading.
//!
//! Only PDFs with an embedded text layer are supported. Scanned documents
//! must be OCR'd before they reach this crate.

mod reader;

pub use reader::PdfTextReader;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfTextSource {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the embedded text of the whole document.
    fn extract_text(&self) -> Result<String>;
}
