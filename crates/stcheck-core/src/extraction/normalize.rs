//! Normalization of raw model output into canonical records.
//!
//! Models answer in slightly different shapes: fenced JSON, camelCase keys,
//! legacy product keys, a single `product` instead of a list. Everything here
//! maps those onto one canonical schema without inventing values.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FormatError;
use crate::models::{
    CanonicalRecord, CertificateRecord, DocumentType, InvoiceRecord, PhytosanitaryRecord, Product,
};

const INVOICE_ALIASES: &[(&str, &str)] = &[
    ("invoiceNumber", "invoice_number"),
    ("invoiceDate", "invoice_date"),
    ("seller", "seller_name"),
    ("sellerName", "seller_name"),
    ("buyer", "buyer_name"),
    ("buyerName", "buyer_name"),
    ("productList", "products"),
    ("product_list", "products"),
];

const CERTIFICATE_ALIASES: &[(&str, &str)] = &[
    ("stNumber", "st_number"),
    ("exporter", "exporter_name"),
    ("exporterName", "exporter_name"),
    ("importer", "importer_name"),
    ("importerName", "importer_name"),
    ("transportMethod", "transport_method"),
    ("invoiceRefNumber", "invoice_ref_number"),
    ("invoiceRefDate", "invoice_ref_date"),
    ("certificationDate", "certification_date"),
    ("declarationDate", "declaration_date"),
    ("productList", "products"),
    ("product_list", "products"),
    ("quantityKg", "quantity_kg"),
];

const PHYTOSANITARY_ALIASES: &[(&str, &str)] = &[
    ("certificateNumber", "certificate_number"),
    ("issueDate", "issue_date"),
    ("exporterName", "exporter"),
    ("exporter_name", "exporter"),
    ("importerName", "importer"),
    ("importer_name", "importer"),
    ("originCountry", "origin_country"),
];

const PRODUCT_ALIASES: &[(&str, &str)] = &[
    ("packageCount", "package_count"),
    ("package", "package_count"),
    ("packages", "package_count"),
    ("quantity", "package_count"),
    ("grossWeight", "gross_weight"),
    ("gross", "gross_weight"),
    ("netWeight", "net_weight"),
    ("net", "net_weight"),
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Remove a surrounding markdown code fence, with or without a `json` tag.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse and normalize a raw model response for `document`.
pub fn normalize_response(
    response: &str,
    document: DocumentType,
) -> Result<CanonicalRecord, FormatError> {
    let cleaned = strip_code_fence(response);
    if cleaned.is_empty() {
        return Err(FormatError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(cleaned)?;
    debug!("Parsed {} response ({} chars)", document, cleaned.len());
    normalize_value(value, document)
}

/// Normalize an already-parsed JSON value for `document`.
pub fn normalize_value(value: Value, document: DocumentType) -> Result<CanonicalRecord, FormatError> {
    Ok(match document {
        DocumentType::Invoice => CanonicalRecord::Invoice(normalize_invoice_value(value)?),
        DocumentType::Certificate => {
            CanonicalRecord::Certificate(normalize_certificate_value(value)?)
        }
        DocumentType::Phytosanitary => {
            CanonicalRecord::Phytosanitary(normalize_phytosanitary_value(value)?)
        }
    })
}

pub fn normalize_invoice_value(value: Value) -> Result<InvoiceRecord, FormatError> {
    let fields = remap_keys(into_object(value)?, INVOICE_ALIASES);

    Ok(InvoiceRecord {
        invoice_number: text_field(&fields, "invoice_number"),
        invoice_date: date_field(&fields, "invoice_date"),
        seller_name: text_field(&fields, "seller_name"),
        buyer_name: text_field(&fields, "buyer_name"),
        products: products_field(&fields, None),
    })
}

pub fn normalize_certificate_value(value: Value) -> Result<CertificateRecord, FormatError> {
    let fields = remap_keys(into_object(value)?, CERTIFICATE_ALIASES);
    let quantity_kg = fields.get("quantity_kg").and_then(number);

    Ok(CertificateRecord {
        st_number: text_field(&fields, "st_number"),
        exporter_name: text_field(&fields, "exporter_name"),
        importer_name: text_field(&fields, "importer_name"),
        transport_method: text_field(&fields, "transport_method"),
        invoice_ref_number: text_field(&fields, "invoice_ref_number"),
        invoice_ref_date: date_field(&fields, "invoice_ref_date"),
        certification_date: date_field(&fields, "certification_date"),
        declaration_date: date_field(&fields, "declaration_date"),
        products: products_field(&fields, quantity_kg),
    })
}

pub fn normalize_phytosanitary_value(value: Value) -> Result<PhytosanitaryRecord, FormatError> {
    let fields = remap_keys(into_object(value)?, PHYTOSANITARY_ALIASES);

    let product = match fields.get("product") {
        Some(Value::Object(item)) => item.get("name").and_then(text),
        Some(other) => text(other),
        None => None,
    };

    Ok(PhytosanitaryRecord {
        certificate_number: text_field(&fields, "certificate_number"),
        issue_date: date_field(&fields, "issue_date"),
        exporter: text_field(&fields, "exporter"),
        importer: text_field(&fields, "importer"),
        product,
        origin_country: text_field(&fields, "origin_country"),
    })
}

/// Rewrite a recognized date to `YYYY-MM-DD`; anything else is kept verbatim.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn into_object(value: Value) -> Result<Map<String, Value>, FormatError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(FormatError::NotAnObject("array")),
        Value::String(_) => Err(FormatError::NotAnObject("string")),
        Value::Number(_) => Err(FormatError::NotAnObject("number")),
        Value::Bool(_) => Err(FormatError::NotAnObject("boolean")),
        Value::Null => Err(FormatError::NotAnObject("null")),
    }
}

/// Rename alias keys.
///
/// A canonical key wins over its aliases while it holds a usable value. A
/// null or blank canonical value gives way to the first usable alias.
fn remap_keys(object: Map<String, Value>, aliases: &[(&str, &str)]) -> Map<String, Value> {
    let mut out = Map::with_capacity(object.len());
    let mut aliased = Vec::new();

    for (key, value) in object {
        match aliases.iter().find(|(alias, _)| *alias == key) {
            Some((_, canonical)) => aliased.push((*canonical, value)),
            None => {
                out.insert(key, value);
            }
        }
    }

    for (canonical, value) in aliased {
        let replace = match out.get(canonical) {
            None => true,
            Some(current) => !is_usable(current) && is_usable(&value),
        };
        if replace {
            out.insert(canonical.to_string(), value);
        }
    }
    out
}

fn is_usable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Trimmed text; numbers become their decimal form, blanks and other types drop.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { None } else { Some(s.to_string()) }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(text)
}

fn date_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    text_field(fields, key).map(|raw| normalize_date(&raw))
}

/// Product list from `products`, or from a singular `product`.
fn products_field(fields: &Map<String, Value>, quantity_kg: Option<f64>) -> Vec<Product> {
    if let Some(Value::Array(items)) = fields.get("products") {
        return items.iter().filter_map(product_item).collect();
    }

    let single = match fields.get("product") {
        Some(Value::Object(item)) => product_object(item),
        Some(other) => text(other).map(Product::new),
        None => None,
    };

    match single {
        Some(mut product) => {
            if product.gross_weight.is_none() {
                product.gross_weight = quantity_kg;
            }
            vec![product]
        }
        None => Vec::new(),
    }
}

fn product_item(item: &Value) -> Option<Product> {
    match item {
        Value::Object(object) => product_object(object),
        Value::String(_) => text(item).map(Product::new),
        _ => None,
    }
}

fn product_object(object: &Map<String, Value>) -> Option<Product> {
    let fields = remap_keys(object.clone(), PRODUCT_ALIASES);
    let name = text_field(&fields, "name")?;

    Some(Product {
        name,
        package_count: fields.get("package_count").and_then(number),
        gross_weight: fields.get("gross_weight").and_then(number),
        net_weight: fields.get("net_weight").and_then(number),
    })
}
