//! Ollama configuration

use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

use mmrag_core::{Error, Result};

/// Configuration for the Ollama chat and embedding endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub embed_model: String,
    pub embed_dimension: usize,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "gemma3:4b".to_string(),
            embed_model: "all-minilm".to_string(),
            embed_dimension: 384,
            timeout_secs: 120,
        }
    }
}

impl OllamaConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let host = env::var("OLLAMA_HOST").unwrap_or(defaults.host);
        let model = env::var("OLLAMA_MODEL").unwrap_or(defaults.model);
        let embed_model = env::var("OLLAMA_EMBED_MODEL").unwrap_or(defaults.embed_model);

        let embed_dimension = match env::var("OLLAMA_EMBED_DIM") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                Error::Configuration(format!("OLLAMA_EMBED_DIM has an invalid value: {}", raw))
            })?,
            Err(_) => defaults.embed_dimension,
        };

        let timeout_secs = match env::var("OLLAMA_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                Error::Configuration(format!("OLLAMA_TIMEOUT_SECS has an invalid value: {}", raw))
            })?,
            Err(_) => defaults.timeout_secs,
        };

        let config = Self {
            host,
            model,
            embed_model,
            embed_dimension,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration for an explicit host with default models
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Check the host is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.host)
            .map_err(|e| Error::Configuration(format!("invalid OLLAMA_HOST {}: {}", self.host, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "OLLAMA_HOST must use http or https, got {}",
                url.scheme()
            )));
        }
        if self.embed_dimension == 0 {
            return Err(Error::Configuration(
                "embedding dimension must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.host.trim_end_matches('/'))
    }

    pub fn embed_url(&self) -> String {
        format!("{}/api/embed", self.host.trim_end_matches('/'))
    }
}
