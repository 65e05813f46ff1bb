//! Configuration
//!
//! One explicit `GreenRouteConfig` object, loaded from TOML and passed to the
//! factory, gateway and planner at construction. Every section has defaults,
//! so an empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::llm::GenerationParams;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required config value: {0}")]
    Missing(&'static str),

    #[error("Environment variable {0} is not set")]
    UnresolvedEnv(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GreenRouteConfig {
    pub llm: LlmConfig,
    pub gateway: GatewayConfig,
    pub planner: PlannerConfig,
    pub distances: DistanceConfig,
}

/// Generation service identity and sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "openai" or "stub"
    pub provider: String,
    pub base_url: String,
    pub model: String,
    /// Literal key, or "env:NAME" to read it from the environment
    pub api_key: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    /// Fixed response text for the stub provider
    pub stub_response: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            provider: "openai".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key: "env:OPENAI_API_KEY".to_string(),
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
            stub_response: None,
        }
    }
}

impl LlmConfig {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        }
    }

    /// Resolve `api_key`, following an `env:` reference
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        let key = match self.api_key.strip_prefix("env:") {
            Some(var) => std::env::var(var).map_err(|_| ConfigError::UnresolvedEnv(var.to_string()))?,
            None => self.api_key.clone(),
        };
        if key.trim().is_empty() {
            return Err(ConfigError::Missing("llm.api_key"));
        }
        Ok(key)
    }
}

/// Transport retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Attempts per generation, including the first
    pub max_attempts: u32,
    /// Base backoff, doubled after every failed attempt
    pub backoff_ms: u64,
    /// Bound on each external call
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 500,
            timeout_secs: 60,
        }
    }
}

/// Orchestrator policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Additional attempts after the first one fails
    pub retry_budget: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            retry_budget: crate::planner::DEFAULT_RETRY_BUDGET,
        }
    }
}

/// Known distance data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    pub legs: Vec<LegDistance>,
    pub coordinates: Vec<NamedCoordinate>,
}

/// Fixed distance between two locations, in miles (either direction)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegDistance {
    pub from: String,
    pub to: String,
    pub miles: f64,
}

/// Location coordinates in degrees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedCoordinate {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl GreenRouteConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), provider = %config.llm.provider, "loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML string and check its values
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GreenRouteConfig = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.gateway.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "gateway.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "gateway.timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(leg) = self
            .distances
            .legs
            .iter()
            .find(|leg| !leg.miles.is_finite() || leg.miles < 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "distance {} -> {} must be a non-negative number of miles",
                leg.from, leg.to
            )));
        }
        if let Some(c) = self.distances.coordinates.iter().find(|c| {
            !c.lat.is_finite()
                || !c.lon.is_finite()
                || !(-90.0..=90.0).contains(&c.lat)
                || !(-180.0..=180.0).contains(&c.lon)
        }) {
            return Err(ConfigError::Invalid(format!(
                "coordinates for {} must be a finite latitude in [-90, 90] and longitude in [-180, 180]",
                c.name
            )));
        }
        Ok(())
    }
}
