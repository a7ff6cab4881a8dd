//! Deterministic cross-check of an invoice against its certificate of origin.
//!
//! The engine never calls a model. Missing data is reported as a
//! discrepancy, never as an error.

pub mod company;
pub mod compare;

pub use company::{CompanyNameNormalizer, KeywordCompanyNormalizer};
pub use compare::{compare_dates, format_quantity, normalize_for_compare};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::models::{
    CertificateRecord, Discrepancy, InvoiceRecord, Product, ValidationConfig, ValidationVerdict,
};

const NOT_SPECIFIED: &str = "not specified";

/// Validate with the default engine.
pub fn validate(invoice: &InvoiceRecord, certificate: &CertificateRecord) -> ValidationVerdict {
    RuleEngine::new().validate(invoice, certificate)
}

/// Rule engine with a pluggable company-name normalizer.
#[derive(Clone)]
pub struct RuleEngine {
    company: Arc<dyn CompanyNameNormalizer>,
    transport_keyword: String,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::from_config(&ValidationConfig::default())
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self {
            company: Arc::new(KeywordCompanyNormalizer::russian()),
            transport_keyword: normalize_for_compare(&config.transport_keyword),
        }
    }

    pub fn with_company_normalizer(mut self, normalizer: impl CompanyNameNormalizer + 'static) -> Self {
        self.company = Arc::new(normalizer);
        self
    }

    pub fn with_transport_keyword(mut self, keyword: &str) -> Self {
        self.transport_keyword = normalize_for_compare(keyword);
        self
    }

    /// Run all rules. Discrepancies come out in rule order, product rules in
    /// invoice product order.
    pub fn validate(&self, invoice: &InvoiceRecord, certificate: &CertificateRecord) -> ValidationVerdict {
        if invoice.products.is_empty() {
            debug!("Invoice has no products, stopping");
            return ValidationVerdict::from_errors(vec![Discrepancy::new(
                "products",
                "",
                "",
                "invoice products unextractable, validation impossible",
            )]);
        }
        if certificate.products.is_empty() {
            debug!("Certificate has no products, stopping");
            return ValidationVerdict::from_errors(vec![Discrepancy::new(
                "products",
                "",
                "",
                "certificate products unextractable, validation impossible",
            )]);
        }

        let mut errors = Vec::new();

        self.check_party(
            &mut errors,
            "exporter",
            invoice.seller_name.as_deref(),
            certificate.exporter_name.as_deref(),
            "exporter name does not match",
        );
        self.check_party(
            &mut errors,
            "importer",
            invoice.buyer_name.as_deref(),
            certificate.importer_name.as_deref(),
            "importer name does not match",
        );
        self.check_transport(&mut errors, certificate.transport_method.as_deref());
        check_products(&mut errors, &invoice.products, &certificate.products);
        check_references(&mut errors, invoice, certificate);
        check_dates(&mut errors, invoice, certificate);

        debug!("Validation finished with {} discrepancies", errors.len());
        ValidationVerdict::from_errors(errors)
    }

    fn same_company(&self, a: Option<&str>, b: Option<&str>) -> bool {
        let name = |v: Option<&str>| v.map(|s| self.company.company_name(s)).unwrap_or_default();
        name(a) == name(b)
    }

    fn check_party(
        &self,
        errors: &mut Vec<Discrepancy>,
        field: &str,
        invoice: Option<&str>,
        certificate: Option<&str>,
        description: &str,
    ) {
        if !self.same_company(invoice, certificate) {
            errors.push(Discrepancy::new(
                field,
                invoice.unwrap_or_default(),
                certificate.unwrap_or_default(),
                description,
            ));
        }
    }

    fn check_transport(&self, errors: &mut Vec<Discrepancy>, transport: Option<&str>) {
        match transport.map(str::trim).filter(|t| !t.is_empty()) {
            None => errors.push(Discrepancy::new(
                "transport_method",
                "",
                "",
                "transport method not specified",
            )),
            Some(method) if !normalize_for_compare(method).contains(&self.transport_keyword) => {
                errors.push(Discrepancy::new(
                    "transport_method",
                    "",
                    method,
                    "transport method must be road transport",
                ))
            }
            Some(_) => {}
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("locale", &self.company.locale())
            .field("transport_keyword", &self.transport_keyword)
            .finish()
    }
}

/// Pairs invoice products with certificate products by normalized name.
///
/// The k-th invoice item with a given name gets the k-th certificate item of
/// that name; once those run out the first one is reused.
struct ProductMatcher<'a> {
    certificate: &'a [Product],
    by_name: HashMap<String, Vec<usize>>,
    used: HashMap<String, usize>,
}

impl<'a> ProductMatcher<'a> {
    fn new(certificate: &'a [Product]) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, product) in certificate.iter().enumerate() {
            by_name
                .entry(normalize_for_compare(&product.name))
                .or_default()
                .push(idx);
        }
        Self {
            certificate,
            by_name,
            used: HashMap::new(),
        }
    }

    fn pair(&mut self, name: &str) -> Option<&'a Product> {
        let key = normalize_for_compare(name);
        let candidates = self.by_name.get(&key)?;
        let seen = self.used.entry(key).or_insert(0);
        let idx = candidates.get(*seen).or(candidates.first())?;
        *seen += 1;
        let certificate = self.certificate;
        Some(&certificate[*idx])
    }
}

fn check_products(errors: &mut Vec<Discrepancy>, invoice: &[Product], certificate: &[Product]) {
    let mut matcher = ProductMatcher::new(certificate);

    for item in invoice {
        let Some(paired) = matcher.pair(&item.name) else {
            errors.push(Discrepancy::new(
                "product_name",
                item.name.as_str(),
                "",
                "invoice product not found on certificate",
            ));
            continue;
        };

        match (item.package_count, paired.package_count) {
            (Some(a), Some(b)) if a != b => errors.push(Discrepancy::new(
                "package_count",
                format_quantity(a),
                format_quantity(b),
                "package count does not match",
            )),
            (Some(_), Some(_)) => {}
            (a, b) => errors.push(Discrepancy::new(
                "package_count",
                a.map(format_quantity).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                b.map(format_quantity).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                "package count not specified",
            )),
        }

        if let (Some(a), Some(b)) = (item.gross_weight, paired.gross_weight) {
            if a != b {
                errors.push(Discrepancy::new(
                    "gross_weight",
                    format_quantity(a),
                    format_quantity(b),
                    "gross weight does not match",
                ));
            }
        }

        if let (Some(a), Some(b)) = (item.net_weight, paired.net_weight) {
            if a != b {
                errors.push(Discrepancy::new(
                    "net_weight",
                    format_quantity(a),
                    format_quantity(b),
                    "net weight does not match",
                ));
            }
        }
    }
}

fn check_references(errors: &mut Vec<Discrepancy>, invoice: &InvoiceRecord, certificate: &CertificateRecord) {
    if let (Some(number), Some(reference)) = (&invoice.invoice_number, &certificate.invoice_ref_number) {
        if number != reference {
            errors.push(Discrepancy::new(
                "invoice_number",
                number.as_str(),
                reference.as_str(),
                "invoice number does not match certificate box 10",
            ));
        }
    }

    if let (Some(date), Some(reference)) = (&invoice.invoice_date, &certificate.invoice_ref_date) {
        if date != reference {
            errors.push(Discrepancy::new(
                "invoice_date",
                date.as_str(),
                reference.as_str(),
                "invoice date does not match certificate box 10",
            ));
        }
    }
}

fn check_dates(errors: &mut Vec<Discrepancy>, invoice: &InvoiceRecord, certificate: &CertificateRecord) {
    let Some(invoice_date) = invoice.invoice_date.as_deref() else {
        return;
    };

    let rules = [
        (
            "certification_date",
            certificate.certification_date.as_deref(),
            "certification date precedes invoice date",
        ),
        (
            "declaration_date",
            certificate.declaration_date.as_deref(),
            "declaration date precedes invoice date",
        ),
    ];

    for (field, date, description) in rules {
        let Some(date) = date else { continue };
        if compare_dates(date, invoice_date) == Ordering::Less {
            errors.push(Discrepancy::new(field, invoice_date, date, description));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationStatus;
    use pretty_assertions::assert_eq;

    fn persimmon() -> Product {
        Product::new("Хурма свежая")
            .with_package_count(10.0)
            .with_gross_weight(200.0)
            .with_net_weight(190.0)
    }

    fn invoice() -> InvoiceRecord {
        InvoiceRecord {
            invoice_number: Some("15".to_string()),
            invoice_date: Some("2024-02-01".to_string()),
            seller_name: Some("СП ООО \"Agro Fruit\" Республика Узбекистан, г. Ташкент".to_string()),
            buyer_name: Some("ООО Восток г. Москва, ул. Ленина, д. 5".to_string()),
            products: vec![persimmon()],
        }
    }

    fn certificate() -> CertificateRecord {
        CertificateRecord {
            st_number: Some("UZRU 0001".to_string()),
            exporter_name: Some("Agro Fruit".to_string()),
            importer_name: Some("ООО «Восток»".to_string()),
            transport_method: Some("Автотранспортом".to_string()),
            invoice_ref_number: Some("15".to_string()),
            invoice_ref_date: Some("2024-02-01".to_string()),
            certification_date: Some("2024-02-03".to_string()),
            declaration_date: Some("2024-02-02".to_string()),
            products: vec![persimmon()],
        }
    }

    fn fields(verdict: &ValidationVerdict) -> Vec<&str> {
        verdict.errors().iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_matching_documents_are_ok() {
        let verdict = validate(&invoice(), &certificate());

        assert_eq!(verdict.status(), ValidationStatus::Ok);
        assert!(verdict.errors().is_empty());
    }

    #[test]
    fn test_single_field_change_gives_single_discrepancy() {
        let mut cert = certificate();
        cert.importer_name = Some("ООО Запад".to_string());

        let verdict = validate(&invoice(), &cert);

        assert_eq!(verdict.status(), ValidationStatus::Mismatch);
        assert_eq!(fields(&verdict), vec!["importer"]);
        assert_eq!(verdict.errors()[0].certificate_value, "ООО Запад");
    }

    #[test]
    fn test_missing_package_count() {
        let mut cert = certificate();
        cert.products[0].package_count = None;

        let verdict = validate(&invoice(), &cert);

        assert_eq!(
            verdict.errors(),
            &[Discrepancy::new(
                "package_count",
                "10",
                "not specified",
                "package count not specified"
            )]
        );
    }

    #[test]
    fn test_empty_invoice_products_fail_fast() {
        let mut inv = invoice();
        inv.products.clear();
        let mut cert = certificate();
        cert.transport_method = None;

        let verdict = validate(&inv, &cert);

        assert_eq!(fields(&verdict), vec!["products"]);
        assert!(verdict.errors()[0].description.starts_with("invoice products"));
    }

    #[test]
    fn test_empty_certificate_products_fail_fast() {
        let mut cert = certificate();
        cert.products.clear();

        let verdict = validate(&invoice(), &cert);

        assert_eq!(fields(&verdict), vec!["products"]);
        assert!(verdict.errors()[0].description.starts_with("certificate products"));
    }

    #[test]
    fn test_certificate_predates_invoice() {
        let mut cert = certificate();
        cert.certification_date = Some("2024-01-01".to_string());

        let verdict = validate(&invoice(), &cert);

        assert_eq!(
            verdict.errors(),
            &[Discrepancy::new(
                "certification_date",
                "2024-02-01",
                "2024-01-01",
                "certification date precedes invoice date"
            )]
        );
    }

    #[test]
    fn test_declaration_predates_invoice() {
        let mut cert = certificate();
        cert.declaration_date = Some("2024-01-15".to_string());
        cert.products[0].package_count = Some(11.0);

        let verdict = validate(&invoice(), &cert);

        assert_eq!(fields(&verdict), vec!["package_count", "declaration_date"]);
        assert_eq!(
            verdict.errors()[1],
            Discrepancy::new(
                "declaration_date",
                "2024-02-01",
                "2024-01-15",
                "declaration date precedes invoice date"
            )
        );
    }

    #[test]
    fn test_invoice_date_reference_mismatch() {
        let mut cert = certificate();
        cert.invoice_ref_date = Some("2024-02-05".to_string());
        cert.products[0].gross_weight = Some(210.0);

        let verdict = validate(&invoice(), &cert);

        assert_eq!(fields(&verdict), vec!["gross_weight", "invoice_date"]);
        assert_eq!(
            verdict.errors()[1],
            Discrepancy::new(
                "invoice_date",
                "2024-02-01",
                "2024-02-05",
                "invoice date does not match certificate box 10"
            )
        );
    }

    #[test]
    fn test_parties_missing_on_both_sides_match() {
        let mut inv = invoice();
        inv.seller_name = None;
        inv.buyer_name = None;
        let mut cert = certificate();
        cert.exporter_name = None;
        cert.importer_name = None;

        assert!(validate(&inv, &cert).is_ok());

        cert.exporter_name = Some("Agro Fruit".to_string());
        cert.products[0].package_count = Some(12.0);
        let verdict = validate(&inv, &cert);

        assert_eq!(fields(&verdict), vec!["exporter", "package_count"]);
        assert_eq!(verdict.errors()[0].invoice_value, "");
    }

    #[test]
    fn test_transport_rules() {
        let mut cert = certificate();
        cert.transport_method = Some("Авиа".to_string());
        let verdict = validate(&invoice(), &cert);
        assert_eq!(verdict.errors()[0].description, "transport method must be road transport");

        cert.transport_method = Some("  ".to_string());
        let verdict = validate(&invoice(), &cert);
        assert_eq!(verdict.errors()[0].description, "transport method not specified");
    }

    #[test]
    fn test_weights_and_unknown_product() {
        let mut inv = invoice();
        inv.products[0].net_weight = Some(180.0);
        inv.products.push(Product::new("Гранат").with_package_count(5.0));

        let verdict = validate(&inv, &certificate());

        assert_eq!(fields(&verdict), vec!["net_weight", "product_name"]);
        assert_eq!(verdict.errors()[0].invoice_value, "180");
        assert_eq!(verdict.errors()[1].invoice_value, "Гранат");
    }

    #[test]
    fn test_weight_missing_on_one_side_is_ignored() {
        let mut cert = certificate();
        cert.products[0].gross_weight = None;
        assert!(validate(&invoice(), &cert).is_ok());
    }

    #[test]
    fn test_permuting_certificate_products() {
        let mut inv = invoice();
        inv.products.push(Product::new("Гранат").with_package_count(5.0));
        let mut cert = certificate();
        cert.products.push(Product::new("гранат").with_package_count(5.0));

        let forward = validate(&inv, &cert);
        cert.products.reverse();
        let reversed = validate(&inv, &cert);

        assert!(forward.is_ok());
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_duplicate_names_pair_positionally() {
        let mut inv = invoice();
        inv.products = vec![
            Product::new("Хурма").with_package_count(10.0),
            Product::new("Хурма").with_package_count(20.0),
            Product::new("Хурма").with_package_count(10.0),
        ];
        let mut cert = certificate();
        cert.products = vec![
            Product::new("Хурма").with_package_count(10.0),
            Product::new("Хурма").with_package_count(20.0),
        ];

        let verdict = validate(&inv, &cert);

        // Third invoice item falls back to the first certificate item.
        assert!(verdict.is_ok());
    }

    #[test]
    fn test_reference_mismatch() {
        let mut cert = certificate();
        cert.invoice_ref_number = Some("16".to_string());
        cert.invoice_ref_date = None;

        let verdict = validate(&invoice(), &cert);

        assert_eq!(fields(&verdict), vec!["invoice_number"]);
    }

    #[test]
    fn test_custom_company_normalizer() {
        struct ExactNames;

        impl CompanyNameNormalizer for ExactNames {
            fn locale(&self) -> &str {
                "und"
            }

            fn company_name(&self, raw: &str) -> String {
                raw.to_string()
            }
        }

        let engine = RuleEngine::new().with_company_normalizer(ExactNames);
        let verdict = engine.validate(&invoice(), &certificate());

        assert_eq!(fields(&verdict), vec!["exporter", "importer"]);
    }
}
