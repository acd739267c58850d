//! Error types for the application layer.

use crate::config::ConfigError;
use effect_framework::{CacheKeyError, HttpJsonError, HttpRequestError};
use thiserror::Error;

/// Failures that stop the application before or outside a request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid cache key: {0}")]
    CacheKey(#[from] CacheKeyError),

    #[error("Failed to open storage: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Failed to build HTTP client: {0}")]
    Transport(#[from] HttpRequestError),

    #[error("{}", user_message(.0))]
    Request(#[from] HttpJsonError),
}

/// The message shown to a person for a failed fetch.
pub fn user_message(error: &HttpJsonError) -> String {
    match error {
        HttpJsonError::Request(_) => "Failed to connect to server".to_string(),
        HttpJsonError::ContentType(_) => "Unexpected response from server".to_string(),
        HttpJsonError::ResponseStatus(e) => format!("Request failed with status: {}", e.status),
        HttpJsonError::Decode(_) => "Failed to decode response JSON".to_string(),
    }
}
