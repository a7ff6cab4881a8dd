//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::{PdfTextSource, Result};
use crate::error::PdfError;
use crate::models::PdfConfig;

/// Reads the text layer of a PDF.
pub struct PdfTextReader {
    document: Option<Document>,
    raw_data: Vec<u8>,
    min_text_length: usize,
}

impl PdfTextReader {
    /// Create a reader with the default text-length threshold.
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            min_text_length: config.min_text_length,
        }
    }

    /// Load `data` and return its text layer.
    ///
    /// Fails with [`PdfError::NoTextLayer`] when the document carries less
    /// text than the configured threshold.
    pub fn read_text(&mut self, data: &[u8]) -> Result<String> {
        self.load(data)?;
        let text = self.extract_text()?;
        require_text_layer(text, self.min_text_length)
    }
}

impl Default for PdfTextReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfTextSource for PdfTextReader {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        debug!("Extracted {} chars of text", text.chars().count());
        Ok(text)
    }
}

fn require_text_layer(text: String, min_text_length: usize) -> Result<String> {
    let length = text.trim().chars().count();
    if length < min_text_length {
        return Err(PdfError::NoTextLayer(length));
    }
    Ok(text)
}
