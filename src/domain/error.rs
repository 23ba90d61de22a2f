use thiserror::Error;

/// Core client errors
///
/// Only `RateLimited` and `Connection` are transient; everything else
/// fails the dispatch on the first occurrence.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Rate limit exceeded: {message}")]
    RateLimited { message: String },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("API error: {message}")]
    Provider { message: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ClientError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether a failed attempt may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Connection { .. })
    }
}
