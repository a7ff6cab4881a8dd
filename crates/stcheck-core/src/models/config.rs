//! Configuration structures for the reconciliation pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StcheckError};

/// Main configuration for stcheck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StcheckConfig {
    /// Extraction model connection.
    pub model: ModelConfig,

    /// Extraction pipeline settings.
    pub extraction: ExtractionConfig,

    /// Heuristic line extractor limits.
    pub heuristics: HeuristicsConfig,

    /// Rule engine settings.
    pub validation: ValidationConfig,

    /// PDF text-layer settings.
    pub pdf: PdfConfig,
}

/// Extraction model connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,

    /// Model identifier.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Environment variable holding the API key. The key itself is never
    /// stored in the config file.
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Extraction pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Time allowed for one model call, in milliseconds.
    pub timeout_ms: u64,

    /// Replacement prompt for invoices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_prompt: Option<String>,

    /// Replacement prompt for certificates of origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_prompt: Option<String>,

    /// Replacement prompt for phytosanitary certificates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phytosanitary_prompt: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            invoice_prompt: None,
            certificate_prompt: None,
            phytosanitary_prompt: None,
        }
    }
}

/// Heuristic line extractor limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// Lines scanned after a table header.
    pub header_window: usize,

    /// Maximum products returned by the aggressive strategy.
    pub aggressive_cap: usize,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            header_window: 20,
            aggressive_cap: 10,
        }
    }
}

/// Rule engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Keyword that marks road transport on the certificate.
    pub transport_keyword: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            transport_keyword: "автотранспорт".to_string(),
        }
    }
}

/// PDF text-layer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider a PDF text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

impl StcheckConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| StcheckError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| StcheckError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Model call timeout as a `Duration`.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.extraction.timeout_ms)
    }
}
