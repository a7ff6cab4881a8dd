//! Canonical document records produced by the extraction stage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One line item: a product with its package count and weights.
///
/// Absent numbers serialize as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    /// Product name as written on the document.
    pub name: String,

    /// Number of packages (places).
    #[serde(default)]
    pub package_count: Option<f64>,

    /// Gross weight in kg.
    #[serde(default)]
    pub gross_weight: Option<f64>,

    /// Net weight in kg.
    #[serde(default)]
    pub net_weight: Option<f64>,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_package_count(mut self, count: f64) -> Self {
        self.package_count = Some(count);
        self
    }

    pub fn with_gross_weight(mut self, weight: f64) -> Self {
        self.gross_weight = Some(weight);
        self
    }

    pub fn with_net_weight(mut self, weight: f64) -> Self {
        self.net_weight = Some(weight);
        self
    }

    /// Whether any numeric field was recovered.
    pub fn has_numbers(&self) -> bool {
        self.package_count.is_some() || self.gross_weight.is_some() || self.net_weight.is_some()
    }
}

/// Canonical commercial invoice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(default)]
    pub invoice_number: Option<String>,

    /// Issue date, `YYYY-MM-DD` when recognized.
    #[serde(default)]
    pub invoice_date: Option<String>,

    #[serde(default)]
    pub seller_name: Option<String>,

    #[serde(default)]
    pub buyer_name: Option<String>,

    #[serde(default)]
    pub products: Vec<Product>,
}

/// Canonical certificate of origin (ST-1).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Certificate number (UZRU...).
    #[serde(default)]
    pub st_number: Option<String>,

    #[serde(default)]
    pub exporter_name: Option<String>,

    #[serde(default)]
    pub importer_name: Option<String>,

    #[serde(default)]
    pub transport_method: Option<String>,

    /// Invoice number referenced in box 10.
    #[serde(default)]
    pub invoice_ref_number: Option<String>,

    /// Invoice date referenced in box 10.
    #[serde(default)]
    pub invoice_ref_date: Option<String>,

    /// Box 11.
    #[serde(default)]
    pub certification_date: Option<String>,

    /// Box 12.
    #[serde(default)]
    pub declaration_date: Option<String>,

    #[serde(default)]
    pub products: Vec<Product>,
}

/// Canonical phytosanitary certificate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhytosanitaryRecord {
    #[serde(default)]
    pub certificate_number: Option<String>,

    #[serde(default)]
    pub issue_date: Option<String>,

    #[serde(default)]
    pub exporter: Option<String>,

    #[serde(default)]
    pub importer: Option<String>,

    #[serde(default)]
    pub product: Option<String>,

    #[serde(default)]
    pub origin_country: Option<String>,
}

/// Kind of source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Commercial invoice.
    Invoice,
    /// Certificate of origin (ST-1).
    Certificate,
    /// Phytosanitary certificate.
    Phytosanitary,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Certificate => "certificate",
            DocumentType::Phytosanitary => "phytosanitary",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invoice" => Ok(DocumentType::Invoice),
            "certificate" | "st" | "st1" | "st-1" => Ok(DocumentType::Certificate),
            "phytosanitary" | "fito" => Ok(DocumentType::Phytosanitary),
            _ => Err(AnalysisError::UnsupportedDocumentType(s.to_string())),
        }
    }
}

/// A normalized record of any supported document type.
///
/// Serializes as the plain inner record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanonicalRecord {
    Invoice(InvoiceRecord),
    Certificate(CertificateRecord),
    Phytosanitary(PhytosanitaryRecord),
}

impl CanonicalRecord {
    pub fn document_type(&self) -> DocumentType {
        match self {
            CanonicalRecord::Invoice(_) => DocumentType::Invoice,
            CanonicalRecord::Certificate(_) => DocumentType::Certificate,
            CanonicalRecord::Phytosanitary(_) => DocumentType::Phytosanitary,
        }
    }

    /// Product list, empty for documents that carry none.
    pub fn products(&self) -> &[Product] {
        match self {
            CanonicalRecord::Invoice(r) => &r.products,
            CanonicalRecord::Certificate(r) => &r.products,
            CanonicalRecord::Phytosanitary(_) => &[],
        }
    }

    pub fn into_invoice(self) -> Option<InvoiceRecord> {
        match self {
            CanonicalRecord::Invoice(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_certificate(self) -> Option<CertificateRecord> {
        match self {
            CanonicalRecord::Certificate(r) => Some(r),
            _ => None,
        }
    }
}
