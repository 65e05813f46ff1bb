//! LLM adapters
//!
//! Provider-agnostic boundary to the external generation service:
//! request in, raw text out. No semantic awareness lives here.

pub mod factory;
pub mod openai;
pub mod stub;
pub mod transport;
pub mod transport_fake;
pub mod transport_reqwest;

use std::sync::Arc;

use async_trait::async_trait;

use crate::contracts::GenerationRequest;

pub use factory::create_adapter;
pub use openai::{GenerationParams, OpenAiAdapter};
pub use stub::StubAdapter;
pub use transport::{AdapterError, FakeTransport, HttpTransport, ReqwestTransport, Transport};

/// LLM adapter trait
///
/// All providers implement this trait. The gateway calls adapters through
/// this uniform interface.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Send one request and return the model's raw text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AdapterError>;

    /// Get provider name (for logging)
    fn provider_name(&self) -> &str;
}

#[async_trait]
impl<A: LlmAdapter + ?Sized> LlmAdapter for Arc<A> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AdapterError> {
        (**self).generate(request).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

/// Concrete adapter enum, selected by the factory
#[derive(Debug)]
pub enum Adapter {
    OpenAi(OpenAiAdapter),
    Stub(StubAdapter),
}

#[async_trait]
impl LlmAdapter for Adapter {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AdapterError> {
        match self {
            Adapter::OpenAi(a) => a.generate(request).await,
            Adapter::Stub(a) => a.generate(request).await,
        }
    }

    fn provider_name(&self) -> &str {
        match self {
            Adapter::OpenAi(a) => a.provider_name(),
            Adapter::Stub(a) => a.provider_name(),
        }
    }
}
