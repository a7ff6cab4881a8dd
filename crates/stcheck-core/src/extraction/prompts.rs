//! Extraction prompts, one per document type.

use crate::models::{DocumentType, ExtractionConfig};

/// System instruction sent with every extraction request.
pub const SYSTEM_INSTRUCTION: &str = "You extract structured data from customs documents. \
Extract only what is written in the document. Do not compare, validate or guess values. \
Return ONLY valid JSON, no markdown, no explanations.";

const INVOICE_PROMPT: &str = r#"Extract the following fields from the commercial invoice text.

{
  "invoice_number": string | null,
  "invoice_date": string | null,          // YYYY-MM-DD
  "seller_name": string | null,
  "buyer_name": string | null,
  "products": [
    {
      "name": string,
      "package_count": number | null,
      "gross_weight": number | null,
      "net_weight": number | null
    }
  ]
}

Product table:
- Find the table with a "Наименование товара", "Товар" or "Наименование" column.
- Add one product per row:
  "Наименование товара" -> name
  "Мест" / "Количество мест" -> package_count
  "Брутто" / "Вес брутто" -> gross_weight (kg)
  "Нетто" / "Вес нетто" -> net_weight (kg)
- A missing number is null, but the row is still added.
- products may be empty only when the invoice lists no goods at all.

Example row:
| Хурма свежая сорт Королёк | 3670 | 23130 | 20190 |
becomes
{"name": "Хурма свежая сорт Королёк", "package_count": 3670, "gross_weight": 23130, "net_weight": 20190}

Rules:
- A field that is not present is null.
- Numbers are JSON numbers, not strings.
- Dates use YYYY-MM-DD.
- Output JSON only, without code fences."#;

const CERTIFICATE_PROMPT: &str = r#"Extract the following fields from the ST-1 certificate of origin text.

{
  "st_number": string | null,              // certificate number (UZRU...)
  "exporter_name": string | null,
  "importer_name": string | null,
  "transport_method": string | null,
  "invoice_ref_number": string | null,     // only if written explicitly in box 10
  "invoice_ref_date": string | null,       // only if written explicitly in box 10
  "certification_date": string | null,     // box 11
  "declaration_date": string | null,       // box 12
  "products": [
    {
      "name": string,
      "package_count": number | null,
      "gross_weight": number | null,
      "net_weight": number | null
    }
  ]
}

Rules:
- A field that is not present is null. Never infer a value.
- Numbers are JSON numbers, not strings.
- Dates use YYYY-MM-DD.
- Output JSON only, without code fences."#;

const PHYTOSANITARY_PROMPT: &str = r#"Extract the following fields from the phytosanitary certificate text.

{
  "certificate_number": string | null,
  "issue_date": string | null,             // YYYY-MM-DD
  "exporter": string | null,
  "importer": string | null,
  "product": string | null,
  "origin_country": string | null
}

Rules:
- A field that is not present is null.
- Dates use YYYY-MM-DD.
- Output JSON only, without code fences."#;

/// Prompt set used by the analyzer.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    invoice: String,
    certificate: String,
    phytosanitary: String,
}

impl PromptTemplates {
    /// Built-in prompts with overrides from `config` applied.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let pick = |custom: &Option<String>, default: &str| {
            custom
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        Self {
            invoice: pick(&config.invoice_prompt, INVOICE_PROMPT),
            certificate: pick(&config.certificate_prompt, CERTIFICATE_PROMPT),
            phytosanitary: pick(&config.phytosanitary_prompt, PHYTOSANITARY_PROMPT),
        }
    }

    pub fn with_prompt(mut self, document: DocumentType, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        match document {
            DocumentType::Invoice => self.invoice = prompt,
            DocumentType::Certificate => self.certificate = prompt,
            DocumentType::Phytosanitary => self.phytosanitary = prompt,
        }
        self
    }

    pub fn prompt(&self, document: DocumentType) -> &str {
        match document {
            DocumentType::Invoice => &self.invoice,
            DocumentType::Certificate => &self.certificate,
            DocumentType::Phytosanitary => &self.phytosanitary,
        }
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}
