use crate::error::ConfigError;
use axum::http::HeaderName;
use config::{Config, Environment};
use notably::providers::configs::{OpenAiProviderConfig, OPENAI_HOST, OPENAI_MODEL};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Header carrying the user id, set by the fronting auth layer
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            identity_header: default_identity_header(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidAddress(format!("{}:{} ({})", self.host, self.port, e)))
    }

    pub fn identity_header(&self) -> Result<HeaderName, ConfigError> {
        HeaderName::try_from(self.identity_header.to_ascii_lowercase()).map_err(|_| {
            ConfigError::Other(config::ConfigError::Message(format!(
                "invalid identity header name '{}'",
                self.identity_header
            )))
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_openai_host")]
    pub host: String,
    /// Optional: without it every enhancement fails with a configuration error
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            host: default_openai_host(),
            api_key: None,
            model: default_model(),
        }
    }
}

impl ProviderSettings {
    pub fn into_config(self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            host: self.host,
            api_key: self.api_key,
            model: self.model,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("server.identity_header", default_identity_header())?
            // Provider defaults
            .set_default("provider.host", default_openai_host())?
            .set_default("provider.model", default_model())?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("NOTABLY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Self = config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            ConfigError::Other(err)
        })?;
        Ok(settings)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_identity_header() -> String {
    "x-user-id".to_string()
}

fn default_model() -> String {
    OPENAI_MODEL.to_string()
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}
