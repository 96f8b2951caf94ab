use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use summy_llm::{ProviderConfig, ProviderType};
use summy_persist::{MAX_CONVERSATIONS, MAX_MESSAGES_PER_CONVERSATION};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for one HTTP request; event streams are exempt
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

/// Endpoint of the text-generation backend. The model and the API key are
/// user settings, not server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderType,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl From<LlmConfig> for ProviderConfig {
    fn from(config: LlmConfig) -> Self {
        Self {
            provider: config.provider,
            base_url: config.base_url.filter(|url| !url.trim().is_empty()),
            timeout_secs: config.timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    pub max_conversations: usize,
    pub max_messages_per_conversation: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_conversations: MAX_CONVERSATIONS,
            max_messages_per_conversation: MAX_MESSAGES_PER_CONVERSATION,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsConfig {
    /// JSON file holding the user settings; in-memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8787,
                request_timeout_secs: default_request_timeout(),
            },
            cors: CorsConfig {
                enabled: false,
                origins: Vec::new(),
            },
            llm: LlmConfig::default(),
            sessions: SessionsConfig::default(),
            settings: SettingsConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_, LLM_, SESSIONS_, SETTINGS_, LOG_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        for prefix in ["SERVER", "CORS", "LLM", "SESSIONS", "SETTINGS", "LOG"] {
            builder = builder.add_source(
                Environment::default()
                    .prefix(prefix)
                    .separator("_")
                    .try_parsing(true),
            );
        }

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        [server]
        host = "0.0.0.0"
        port = 9000

        [cors]
        enabled = true
        origins = ["chrome-extension://abcdef"]

        [llm]
        provider = "groq"
        timeout_secs = 30

        [sessions]
        max_conversations = 10
        max_messages_per_conversation = 20

        [settings]
        path = "data/settings.json"

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.request_timeout_secs, 300);
        assert_eq!(config.llm.provider, ProviderType::Groq);
        assert_eq!(config.sessions.max_conversations, 10);
        assert_eq!(config.settings.path, Some(PathBuf::from("data/settings.json")));

        let provider: ProviderConfig = config.llm.into();
        assert_eq!(
            provider.resolved_base_url().unwrap(),
            "https://api.groq.com/openai/v1"
        );
    }

    #[test]
    fn test_optional_sections_default() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8787

            [cors]
            enabled = false
            origins = []

            [logging]
            level = "info"
            format = "pretty"
        "#,
        )
        .unwrap();

        assert_eq!(config.llm.provider, ProviderType::OpenAI);
        assert_eq!(config.sessions.max_messages_per_conversation, 100);
        assert!(config.settings.path.is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summy.toml");
        std::fs::write(&path, TOML).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.logging.format, "json");
    }
}
