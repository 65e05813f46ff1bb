//! Fake transport for testing
//!
//! Serves scripted bodies instead of real HTTP calls. The last scripted
//! entry repeats once the script runs out.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::transport::{AdapterError, HttpTransport};

/// Fake transport (uses fixture strings)
#[derive(Debug)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Result<String, AdapterError>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    /// Create fake transport that always returns `response`
    pub fn new(response: &str) -> Self {
        Self::scripted(vec![Ok(response.to_string())])
    }

    /// Create fake transport that always returns a network error
    pub fn with_error(msg: &str) -> Self {
        Self::scripted(vec![Err(AdapterError::Network(msg.to_string()))])
    }

    /// Create fake transport that plays `script` in order
    pub fn scripted(script: Vec<Result<String, AdapterError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn post_json(
        &self,
        _url: &str,
        _headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, AdapterError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(body.to_string());

        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.unwrap_or_else(|| Err(AdapterError::Network("fake transport has no script".to_string())))
    }
}
