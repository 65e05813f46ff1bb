//! Generation gateway
//!
//! Sends a compiled request to the generation service and returns raw text.
//! Owns the transport retry policy: every call is bounded by a timeout, and
//! transient failures are retried with exponential backoff. Content is
//! never inspected here.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::contracts::GenerationRequest;
use crate::llm::{AdapterError, LlmAdapter};

/// Transport-level failure after the retry policy gave up
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("generation service failed after {attempts} attempt(s): {source}")]
pub struct GatewayError {
    pub attempts: u32,
    #[source]
    pub source: AdapterError,
}

/// Retry policy for one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first (at least 1)
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled after each failure
    pub backoff: Duration,
    /// Bound on each call
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&GatewayConfig::default())
    }
}

impl From<&GatewayConfig> for RetryPolicy {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
            call_timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt `attempt + 1`, where `attempt` is 1-based
    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Gateway wrapping one adapter
#[derive(Debug)]
pub struct Gateway<A> {
    adapter: A,
    policy: RetryPolicy,
}

impl<A: LlmAdapter> Gateway<A> {
    pub fn new(adapter: A, policy: RetryPolicy) -> Self {
        Self { adapter, policy }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate raw text for `request`
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        let mut attempt = 1;
        loop {
            debug!(
                attempt,
                provider = self.adapter.provider_name(),
                "calling generation service"
            );

            let outcome = match tokio::time::timeout(
                self.policy.call_timeout,
                self.adapter.generate(request),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(AdapterError::Timeout(format!(
                    "no response within {}s",
                    self.policy.call_timeout.as_secs()
                ))),
            };

            match outcome {
                Ok(text) => return Ok(text),
                Err(err) if err.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "generation call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(source) => {
                    return Err(GatewayError {
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::StubAdapter;
    use crate::trip::{DateRange, Preferences, TripRequest};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    fn request() -> GenerationRequest {
        let trip = TripRequest::new(
            "Irvine, CA",
            Some("Los Angeles, CA".to_string()),
            vec![],
            true,
            Preferences::default(),
            DateRange {
                start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            },
            "",
        )
        .unwrap();
        crate::contracts::compile(&trip, &[])
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::ZERO,
            call_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let p = RetryPolicy {
            max_attempts: 4,
            backoff: Duration::from_millis(100),
            call_timeout: Duration::from_secs(1),
        };
        assert_eq!(p.delay_after(1), Duration::from_millis(100));
        assert_eq!(p.delay_after(2), Duration::from_millis(200));
        assert_eq!(p.delay_after(3), Duration::from_millis(400));
    }

    #[test]
    fn test_policy_from_config_never_zero_attempts() {
        let config = GatewayConfig {
            max_attempts: 0,
            backoff_ms: 10,
            timeout_secs: 2,
        };
        let p = RetryPolicy::from(&config);
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.call_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let stub = StubAdapter::scripted(vec![
            Err(AdapterError::Network("reset".to_string())),
            Err(AdapterError::Http {
                status: 502,
                message: "bad gateway".to_string(),
            }),
            Ok("text".to_string()),
        ]);
        let gateway = Gateway::new(stub, policy(3));
        assert_eq!(gateway.generate(&request()).await.unwrap(), "text");
        assert_eq!(gateway.adapter().call_count(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let stub = StubAdapter::scripted(vec![Err(AdapterError::Network("down".to_string()))]);
        let gateway = Gateway::new(stub, policy(3));
        let err = gateway.generate(&request()).await.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.source, AdapterError::Network("down".to_string()));
        assert_eq!(gateway.adapter().call_count(), 3);
    }

    #[tokio::test]
    async fn test_non_transient_not_retried() {
        let stub = StubAdapter::scripted(vec![Err(AdapterError::Authentication(
            "bad key".to_string(),
        ))]);
        let gateway = Gateway::new(stub, policy(3));
        let err = gateway.generate(&request()).await.unwrap_err();
        assert_eq!(err.attempts, 1);
        assert_eq!(gateway.adapter().call_count(), 1);
    }

    struct SlowAdapter;

    #[async_trait]
    impl LlmAdapter for SlowAdapter {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, AdapterError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".to_string())
        }

        fn provider_name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_counts_as_transport_failure() {
        let gateway = Gateway::new(
            SlowAdapter,
            RetryPolicy {
                max_attempts: 2,
                backoff: Duration::from_millis(10),
                call_timeout: Duration::from_secs(1),
            },
        );
        let err = gateway.generate(&request()).await.unwrap_err();
        assert_eq!(err.attempts, 2);
        assert!(matches!(err.source, AdapterError::Timeout(_)));
    }
}
