//! Validation output types.

use serde::{Deserialize, Serialize};

/// A single mismatch between the invoice and the certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Canonical field identifier (`exporter`, `package_count`, ...).
    pub field: String,
    /// Value on the invoice side, empty when not applicable.
    pub invoice_value: String,
    /// Value on the certificate side, empty when not applicable.
    pub certificate_value: String,
    /// Human-readable explanation.
    pub description: String,
}

impl Discrepancy {
    pub fn new(
        field: impl Into<String>,
        invoice_value: impl Into<String>,
        certificate_value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            invoice_value: invoice_value.into(),
            certificate_value: certificate_value.into(),
            description: description.into(),
        }
    }
}

/// Overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "MISMATCH")]
    Mismatch,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Ok => "OK",
            ValidationStatus::Mismatch => "MISMATCH",
        }
    }
}

/// Result of cross-checking an invoice against a certificate.
///
/// The status is always derived from the error list, so the two can never
/// disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    status: ValidationStatus,
    errors: Vec<Discrepancy>,
}

impl ValidationVerdict {
    pub fn from_errors(errors: Vec<Discrepancy>) -> Self {
        let status = if errors.is_empty() {
            ValidationStatus::Ok
        } else {
            ValidationStatus::Mismatch
        };
        Self { status, errors }
    }

    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == ValidationStatus::Ok
    }

    /// Discrepancies in rule evaluation order.
    pub fn errors(&self) -> &[Discrepancy] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Discrepancy> {
        self.errors
    }
}
