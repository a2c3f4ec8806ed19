//! Error type shared by all provider implementations.

use thiserror::Error;

/// Errors that can occur within a provider implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider's API returned a non-success HTTP status.
    #[error("provider returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Error body or description returned by the API.
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode provider response: {0}")]
    Decode(String),

    /// The request parameters were invalid for this specific provider.
    #[error("invalid parameters for provider: {0}")]
    Validation(String),
}

impl ProviderError {
    /// Whether a retry with the same parameters could plausibly succeed.
    ///
    /// Network-level failures and 429/5xx statuses are transient; decode and
    /// validation failures are not, and 4xx statuses other than 429 indicate
    /// a request the provider will keep rejecting.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Request(e) => !e.is_decode(),
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Decode(_) | ProviderError::Validation(_) => false,
        }
    }
}
