//! Stub adapter
//!
//! Returns scripted responses without network calls and records every
//! request it receives. Used by tests and by the `stub` provider.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::contracts::GenerationRequest;
use crate::llm::transport::AdapterError;
use crate::llm::LlmAdapter;

/// Stub adapter (scripted responses)
#[derive(Debug)]
pub struct StubAdapter {
    script: Mutex<VecDeque<Result<String, AdapterError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl StubAdapter {
    /// Stub that always returns `response`
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(response.into())])
    }

    /// Stub that plays `script` in order; the last entry repeats
    pub fn scripted(script: Vec<Result<String, AdapterError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Stub built from plain response texts
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scripted(responses.into_iter().map(|r| Ok(r.into())).collect())
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of generate calls so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl LlmAdapter for StubAdapter {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AdapterError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.unwrap_or_else(|| {
            Err(AdapterError::Configuration(
                "stub adapter has no scripted response".to_string(),
            ))
        })
    }

    fn provider_name(&self) -> &str {
        "stub"
    }
}
