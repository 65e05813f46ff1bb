//! OpenAI adapter
//!
//! OpenAI-compatible chat-completions API.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::contracts::GenerationRequest;
use crate::llm::transport::{AdapterError, HttpTransport, ReqwestTransport, Transport};
use crate::llm::LlmAdapter;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            max_tokens: 8192,
        }
    }
}

/// OpenAI-compatible adapter
#[derive(Debug)]
pub struct OpenAiAdapter {
    /// Base URL (e.g., https://api.openai.com/v1)
    base_url: String,
    /// Model name (e.g., gpt-4o)
    model: String,
    api_key: String,
    params: GenerationParams,
    transport: Transport,
}

impl OpenAiAdapter {
    /// Create new OpenAI adapter
    pub fn new(base_url: String, model: String, api_key: String, params: GenerationParams) -> Self {
        Self::with_transport(
            base_url,
            model,
            api_key,
            params,
            Transport::Real(ReqwestTransport::new()),
        )
    }

    /// Create adapter with custom transport (for testing)
    pub fn with_transport(
        base_url: String,
        model: String,
        api_key: String,
        params: GenerationParams,
        transport: Transport,
    ) -> Self {
        Self {
            base_url,
            model,
            api_key,
            params,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Build chat request body
    pub fn build_request(&self, request: &GenerationRequest) -> String {
        serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system()},
                {"role": "user", "content": request.prompt()}
            ],
            "temperature": self.params.temperature,
            "top_p": self.params.top_p,
            "max_tokens": self.params.max_tokens,
            "stream": false
        })
        .to_string()
    }
}

#[async_trait]
impl LlmAdapter for OpenAiAdapter {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AdapterError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = self.build_request(request);

        let auth_header = format!("Bearer {}", self.api_key);
        let headers = [
            ("Authorization", auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self.transport.post_json(&url, &headers, &body).await?;
        parse_chat_completion(&response)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

/// Parse OpenAI chat completion JSON response
pub fn parse_chat_completion(response: &str) -> Result<String, AdapterError> {
    let json: JsonValue = serde_json::from_str(response)?;

    let content = json["choices"]
        .get(0)
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            AdapterError::InvalidResponse("Missing choices[0].message.content".to_string())
        })?;

    Ok(content.to_string())
}
