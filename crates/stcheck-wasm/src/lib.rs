//! WASM bindings for invoice / certificate-of-origin reconciliation.
//!
//! Everything here runs without a model: callers extract records elsewhere
//! and use these bindings for normalization, product recovery and the rule
//! engine.

use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use stcheck_core::extraction::{normalize_certificate_value, normalize_invoice_value};
use stcheck_core::heuristics::ProductScanner;
use stcheck_core::models::{DocumentType, HeuristicsConfig};
use stcheck_core::{KeywordCompanyNormalizer, RuleEngine};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Normalize extracted document text.
#[wasm_bindgen]
pub fn normalize_text(text: &str) -> String {
    stcheck_core::normalize_text(text)
}

/// Recover product rows from raw invoice text.
#[wasm_bindgen]
pub fn extract_products_from_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&stcheck_core::extract_products_from_text(text))
}

/// Turn a raw model response into a canonical record.
///
/// `document_type` is `invoice`, `certificate` or `phytosanitary`.
#[wasm_bindgen]
pub fn normalize_extraction_response(response: &str, document_type: &str) -> Result<JsValue, JsValue> {
    let document: DocumentType = document_type.parse().map_err(js_error)?;
    let record = stcheck_core::normalize_response(response, document).map_err(js_error)?;
    to_js(&record)
}

/// Cross-check an invoice record against a certificate record with the
/// default rules.
#[wasm_bindgen]
pub fn validate_records(invoice: JsValue, certificate: JsValue) -> Result<JsValue, JsValue> {
    Reconciler::new().validate(invoice, certificate)
}

/// Configurable rule engine plus product scanner for browser use.
#[wasm_bindgen]
pub struct Reconciler {
    rules: RuleEngine,
    scanner: ProductScanner,
}

#[wasm_bindgen]
impl Reconciler {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            rules: RuleEngine::new(),
            scanner: ProductScanner::new(),
        }
    }

    /// Use the company-name rules for `locale`. Returns false for an unknown
    /// locale and keeps the current rules.
    #[wasm_bindgen]
    pub fn set_locale(&mut self, locale: &str) -> bool {
        match KeywordCompanyNormalizer::for_locale(locale) {
            Some(normalizer) => {
                self.rules = std::mem::take(&mut self.rules).with_company_normalizer(normalizer);
                true
            }
            None => false,
        }
    }

    /// Keyword that marks road transport on the certificate.
    #[wasm_bindgen]
    pub fn set_transport_keyword(&mut self, keyword: &str) {
        self.rules = std::mem::take(&mut self.rules).with_transport_keyword(keyword);
    }

    /// Limit how far the scanner looks below a table header, and how many
    /// rows the aggressive pass may return.
    #[wasm_bindgen]
    pub fn set_heuristic_limits(&mut self, header_window: usize, aggressive_cap: usize) {
        self.scanner = ProductScanner::from_config(&HeuristicsConfig {
            header_window,
            aggressive_cap,
        });
    }

    /// Recover products with confidence scores and source lines.
    #[wasm_bindgen]
    pub fn scan_products(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&stcheck_core::heuristics::scan_with(&self.scanner, text))
    }

    /// Cross-check two records given as plain JS objects.
    #[wasm_bindgen]
    pub fn validate(&self, invoice: JsValue, certificate: JsValue) -> Result<JsValue, JsValue> {
        let invoice = normalize_invoice_value(from_js(invoice)?).map_err(js_error)?;
        let certificate = normalize_certificate_value(from_js(certificate)?).map_err(js_error)?;
        to_js(&self.rules.validate(&invoice, &certificate))
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

fn from_js(value: JsValue) -> Result<Value, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| js_error(e.to_string()))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error(e.to_string()))
}

fn js_error(err: impl ToString) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("Хурма\u{00a0}\u{00a0}свежая"), "Хурма свежая");
    }

    #[wasm_bindgen_test]
    fn test_unknown_locale() {
        let mut reconciler = Reconciler::new();
        assert!(reconciler.set_locale("ru"));
        assert!(!reconciler.set_locale("xx"));
    }

    #[wasm_bindgen_test]
    fn test_unknown_document_type() {
        assert!(normalize_extraction_response("{}", "waybill").is_err());
    }

    #[wasm_bindgen_test]
    fn test_validate_records() {
        let record = r#"{"products": [{"name": "Хурма", "package_count": 10}]}"#;
        let invoice: Value = serde_json::from_str(record).unwrap();
        let certificate: Value = serde_json::from_str(record).unwrap();

        let verdict = validate_records(
            serde_wasm_bindgen::to_value(&invoice).unwrap(),
            serde_wasm_bindgen::to_value(&certificate).unwrap(),
        )
        .unwrap();
        let verdict: Value = serde_wasm_bindgen::from_value(verdict).unwrap();

        // Missing transport method is the only discrepancy.
        assert_eq!(verdict["status"], "MISMATCH");
        assert_eq!(verdict["errors"].as_array().unwrap().len(), 1);
    }
}
