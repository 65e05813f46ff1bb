//! HTTP transport for LLM adapters
//!
//! Adapters talk HTTP through `HttpTransport` so tests can swap in
//! `FakeTransport` fixtures instead of real network calls.

use async_trait::async_trait;

pub use crate::llm::transport_fake::FakeTransport;
pub use crate::llm::transport_reqwest::ReqwestTransport;

/// Adapter errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// Network error (connection refused, reset, DNS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Call exceeded its time bound
    #[error("Timed out: {0}")]
    Timeout(String),

    /// HTTP error (non-2xx status)
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limited
    #[error("Rate limited{retry_after}")]
    RateLimited { retry_after: String },

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(String),
}

impl AdapterError {
    /// Whether a repeat of the same call may succeed
    ///
    /// Connection failures, timeouts and non-success statuses are transient.
    /// Bad credentials, bad configuration and malformed provider envelopes
    /// are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AdapterError::Network(_)
                | AdapterError::Timeout(_)
                | AdapterError::Http { .. }
                | AdapterError::RateLimited { .. }
        )
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Json(err.to_string())
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            AdapterError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() || err.is_body() {
            AdapterError::InvalidResponse(err.to_string())
        } else {
            AdapterError::Network(err.to_string())
        }
    }
}

/// Asynchronous HTTP transport
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST a JSON body and return the response body
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, AdapterError>;
}

/// Concrete transport enum
///
/// Wraps all transport types so adapters hold a plain value.
#[derive(Debug)]
pub enum Transport {
    Real(ReqwestTransport),
    Fake(FakeTransport),
}

#[async_trait]
impl HttpTransport for Transport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, AdapterError> {
        match self {
            Transport::Real(t) => t.post_json(url, headers, body).await,
            Transport::Fake(t) => t.post_json(url, headers, body).await,
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Real(ReqwestTransport::new())
    }
}
