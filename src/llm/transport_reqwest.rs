//! Real HTTP transport using reqwest

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::llm::transport::{AdapterError, HttpTransport};

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Real HTTP transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create new transport with the default timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Create transport with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, AdapterError> {
        debug!(url, body_len = body.len(), timeout_secs = self.timeout.as_secs(), "POST");

        let mut request = self
            .client
            .post(url)
            .timeout(self.timeout)
            .body(body.to_string());
        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "response");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdapterError::Authentication("Invalid API key".to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(|v| format!(" (retry after {}s)", v))
                .unwrap_or_default();
            return Err(AdapterError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(AdapterError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}
