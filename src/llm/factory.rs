//! Adapter factory
//!
//! Creates LLM adapter instances from configuration.

use crate::config::{GatewayConfig, LlmConfig};
use crate::llm::openai::OpenAiAdapter;
use crate::llm::stub::StubAdapter;
use crate::llm::transport::{AdapterError, ReqwestTransport, Transport};
use crate::llm::Adapter;

/// Create adapter from configuration
pub fn create_adapter(llm: &LlmConfig, gateway: &GatewayConfig) -> Result<Adapter, AdapterError> {
    match llm.provider.as_str() {
        "openai" => {
            if llm.base_url.trim().is_empty() {
                return Err(AdapterError::Configuration(
                    "Missing 'base_url' in config".to_string(),
                ));
            }
            if llm.model.trim().is_empty() {
                return Err(AdapterError::Configuration(
                    "Missing 'model' in config".to_string(),
                ));
            }
            let api_key = llm
                .resolve_api_key()
                .map_err(|e| AdapterError::Configuration(e.to_string()))?;

            Ok(Adapter::OpenAi(OpenAiAdapter::with_transport(
                llm.base_url.clone(),
                llm.model.clone(),
                api_key,
                llm.params(),
                Transport::Real(ReqwestTransport::with_timeout(gateway.timeout_secs)),
            )))
        }
        "stub" => {
            let response = llm.stub_response.clone().ok_or_else(|| {
                AdapterError::Configuration("Missing 'stub_response' in config".to_string())
            })?;
            Ok(Adapter::Stub(StubAdapter::with_response(response)))
        }
        other => Err(AdapterError::Configuration(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}
