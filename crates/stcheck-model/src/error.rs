//! Error types for the model layer.

use thiserror::Error;

/// Errors that can occur while calling the extraction model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No API key was found in the configured environment variable.
    #[error("API key is not set (expected in ${0})")]
    MissingApiKey(String),

    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The service rejected the credentials.
    #[error("service rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The service is throttling requests.
    #[error("rate limited by service")]
    RateLimited,

    /// Any other non-success HTTP status.
    #[error("service error (HTTP {status}): {body}")]
    Http { status: u16, body: String },

    /// The service answered with a body that is not a chat completion.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Request(err.to_string())
    }
}
