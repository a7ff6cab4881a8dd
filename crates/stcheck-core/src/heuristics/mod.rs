//! Heuristic product-row extraction from raw document text.
//!
//! Used when the extraction model returns an invoice without products. Every
//! recovered value is a guess and carries a confidence score.

pub mod line;
pub mod patterns;
pub mod strategies;

pub use line::{LineExtractor, NumericAssignment, NumericFields, TrailingWeights};
pub use strategies::{ProductScanner, Strategy};

use serde::Serialize;
use tracing::debug;

use crate::models::Product;
use crate::text::normalize_text;

/// A heuristically extracted value with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Source line the value was read from.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            source: source.into(),
        }
    }
}

/// Extract products from raw text with the default scanner.
pub fn extract_products_from_text(text: &str) -> Vec<Product> {
    extract_product_matches(text)
        .into_iter()
        .map(|m| m.value)
        .collect()
}

/// Extract products with their confidence scores and source lines.
pub fn extract_product_matches(text: &str) -> Vec<ExtractionMatch<Product>> {
    scan_with(&ProductScanner::new(), text)
}

/// Extract products using a configured scanner.
pub fn scan_with(scanner: &ProductScanner, text: &str) -> Vec<ExtractionMatch<Product>> {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    match scanner.scan(&normalized) {
        Some((strategy, matches)) => {
            debug!("Recovered {} products via {}", matches.len(), strategy);
            matches
        }
        None => Vec::new(),
    }
}
