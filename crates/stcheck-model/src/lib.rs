//! Extraction model abstraction layer for stcheck.
//!
//! This crate provides a unified interface for the external model that turns
//! document text into JSON:
//! - `ExtractionModel`, the async seam the extraction pipeline is written against
//! - `OpenAiBackend`, an OpenAI-compatible chat-completions client over `reqwest`

mod backend;
mod error;
mod request;

pub use backend::ExtractionModel;
pub use backend::openai::{OpenAiBackend, OpenAiConfig};
pub use error::ModelError;
pub use request::{CompletionRequest, Message, Role};

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
