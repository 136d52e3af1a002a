//! Gateway error types
//!
//! Typed failures for generation calls, classified so the retry policy can
//! decide between backing off, abandoning a model, or abandoning a provider.

use std::fmt;

/// Failure of a single generation call through the provider gateway
#[derive(Debug, Clone)]
pub enum GatewayError {
    /// No provider with this identifier is configured
    UnknownProvider(String),

    /// The provider's credential environment variable is not set
    MissingCredential {
        /// Provider identifier
        provider: String,
        /// Environment variable that was expected to hold the credential
        env_key: String,
    },

    /// A model returned 404/400/402 and must not be retried
    ModelUnavailable {
        /// Model identifier
        model: String,
        /// HTTP status that ruled the model out
        status: u16,
    },

    /// A single model ran out of retry attempts
    RetriesExhausted {
        /// Model identifier
        model: String,
    },

    /// Every candidate model of a provider failed
    ModelsExhausted {
        /// Provider identifier
        provider: String,
    },

    /// Network or connection failure
    Network(String),

    /// The response body could not be interpreted
    InvalidResponse(String),
}

impl GatewayError {
    /// Whether this failure is worth retrying on the same model
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Network(_) | GatewayError::InvalidResponse(_)
        )
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::UnknownProvider(name) => write!(f, "Unknown provider: {}", name),
            GatewayError::MissingCredential { provider, env_key } => {
                write!(
                    f,
                    "Missing credential for provider {}: {} is not set",
                    provider, env_key
                )
            }
            GatewayError::ModelUnavailable { model, status } => {
                write!(f, "Model {} unavailable (HTTP {})", model, status)
            }
            GatewayError::RetriesExhausted { model } => {
                write!(f, "Retries exhausted for model {}", model)
            }
            GatewayError::ModelsExhausted { provider } => {
                write!(f, "All candidate models failed for provider {}", provider)
            }
            GatewayError::Network(msg) => write!(f, "Network error: {}", msg),
            GatewayError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            GatewayError::Network(format!("Connection failed: {}", err))
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::InvalidResponse(format!("JSON parse error: {}", err))
    }
}
