//! Extraction model backends.

pub mod openai;

use async_trait::async_trait;

use crate::{CompletionRequest, Result};

/// Trait for text-to-JSON extraction models.
///
/// The model is treated as a stateless converter: one request in, one raw
/// text response out. Parsing and schema normalization happen in the caller.
/// Implementations must not retry on their own; retry policy belongs to
/// whoever drives the pipeline.
#[async_trait]
pub trait ExtractionModel: Send + Sync {
    /// Send a single completion request and return the raw response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Model identifier, used in logs.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: ExtractionModel + ?Sized> ExtractionModel for std::sync::Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
