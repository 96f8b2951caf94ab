// Configuration layer for provider-agnostic LLM client creation
// The credential is user data, so clients are built per call from the config plus the key

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::openai::client::OPENAI_API_BASE;
use crate::traits::ChatClient;

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const OLLAMA_API_BASE: &str = "http://localhost:11434/v1";

/// Type of LLM provider. All of them speak the OpenAI chat completions dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    OpenAI,
    Groq,
    Ollama,
    /// Any other OpenAI-compatible endpoint; requires `base_url`
    Compatible,
}

impl ProviderType {
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some(OPENAI_API_BASE),
            Self::Groq => Some(GROQ_API_BASE),
            Self::Ollama => Some(OLLAMA_API_BASE),
            Self::Compatible => None,
        }
    }

    /// Groq and Ollama only accept plain JSON mode, not JSON schemas
    pub fn supports_json_schema(&self) -> bool {
        matches!(self, Self::OpenAI)
    }
}

/// Complete provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: ProviderType,

    /// Overrides the provider's default endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    pub fn openai() -> Self {
        Self::default()
    }

    pub fn compatible(base_url: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::Compatible,
            base_url: Some(base_url.into()),
            timeout_secs: None,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Endpoint the clients will talk to
    pub fn resolved_base_url(&self) -> Result<String> {
        self.base_url
            .clone()
            .or_else(|| self.provider.default_base_url().map(str::to_string))
            .ok_or_else(|| anyhow!("base_url is required for {:?} providers", self.provider))
    }
}

/// Factory for creating LLM clients from configuration
#[derive(Debug, Clone, Default)]
pub struct ClientFactory {
    config: ProviderConfig,
}

impl ClientFactory {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Create a chat client authenticated with `api_key`
    pub fn create_chat_client(&self, api_key: &str) -> Result<Arc<dyn ChatClient>> {
        let base_url = self.config.resolved_base_url()?;
        let timeout = self.config.timeout_secs.map(Duration::from_secs);
        let client = crate::openai::OpenAIClient::with_base_url(api_key, base_url, timeout)?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_openai() {
        let config = ProviderConfig::default();
        assert_eq!(config.provider, ProviderType::OpenAI);
        assert_eq!(config.resolved_base_url().unwrap(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_compatible_requires_base_url() {
        let config = ProviderConfig {
            provider: ProviderType::Compatible,
            ..Default::default()
        };
        assert!(config.resolved_base_url().is_err());

        let config = ProviderConfig::compatible("http://localhost:8080/v1");
        assert_eq!(config.resolved_base_url().unwrap(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_json_schema_support() {
        assert!(ProviderType::OpenAI.supports_json_schema());
        assert!(!ProviderType::Groq.supports_json_schema());
        assert!(!ProviderType::Ollama.supports_json_schema());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = ProviderConfig::compatible("http://localhost:8080/v1").with_timeout(30);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ProviderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.provider, ProviderType::Compatible);
        assert_eq!(deserialized.timeout_secs, Some(30));
    }

    #[test]
    fn test_factory_builds_client() {
        let factory = ClientFactory::new(ProviderConfig::default());
        assert!(factory.create_chat_client("test-key").is_ok());
    }
}
