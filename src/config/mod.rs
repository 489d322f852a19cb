
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

use crate::chunking::ChunkingConfig;

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_PINECONE_API_KEY: &str = "PINECONE_API_KEY";
pub const ENV_PINECONE_INDEX_HOST: &str = "PINECONE_INDEX_HOST";
pub const ENV_PINECONE_INDEX_NAME: &str = "PINECONE_INDEX_NAME";

/// Process-wide configuration. Tunables come from an optional TOML file,
/// secrets and the index host come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub openai: OpenAiConfig,
    pub pinecone: PineconeConfig,
    pub chunking: ChunkingConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    #[serde(skip)]
    pub api_key: String,
    pub base_url: String,
    pub embed_model: String,
    pub chat_model: String,
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4o".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PineconeConfig {
    #[serde(skip)]
    pub api_key: String,
    /// Data-plane host URL of the index, e.g. `https://my-index-abc123.svc.us-east-1.pinecone.io`
    #[serde(skip)]
    pub index_host: String,
    pub index_name: String,
    pub timeout_secs: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index_host: String::new(),
            index_name: String::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryConfig {
    pub top_k: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid timeout: {0} (must be between 1 and 300 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid top_k: {0} (must be between 1 and 100)")]
    InvalidTopK(usize),
    #[error("Invalid chunk size: {0} (must be between 1 and 100000 characters)")]
    InvalidChunkSize(usize),
    #[error("Chunk overlap ({0}) must be smaller than chunk size ({1})")]
    OverlapTooLarge(usize, usize),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Config {
    /// Load configuration: TOML tunables (if a file is given and exists),
    /// then secrets from the environment, then validation.
    #[inline]
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                toml::from_str::<Config>(&content)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            _ => Config::default(),
        };

        config.openai.api_key = require_env(ENV_OPENAI_API_KEY)?;
        config.pinecone.api_key = require_env(ENV_PINECONE_API_KEY)?;
        config.pinecone.index_host = require_env(ENV_PINECONE_INDEX_HOST)?;
        if let Ok(name) = env::var(ENV_PINECONE_INDEX_NAME) {
            config.pinecone.index_name = name;
        }

        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.openai.validate()?;
        self.pinecone.validate()?;

        if self.chunking.chunk_size == 0 || self.chunking.chunk_size > 100_000 {
            return Err(ConfigError::InvalidChunkSize(self.chunking.chunk_size));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(ConfigError::OverlapTooLarge(
                self.chunking.overlap,
                self.chunking.chunk_size,
            ));
        }

        if self.query.top_k == 0 || self.query.top_k > 100 {
            return Err(ConfigError::InvalidTopK(self.query.top_k));
        }

        Ok(())
    }
}

impl OpenAiConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.embed_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.embed_model.clone()));
        }
        if self.chat_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.chat_model.clone()));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ConfigError::InvalidTimeout(self.timeout_secs));
        }
        Ok(())
    }

    #[inline]
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|_| ConfigError::InvalidUrl(self.base_url.clone()))
    }
}

impl PineconeConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.index_url()?;
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ConfigError::InvalidTimeout(self.timeout_secs));
        }
        Ok(())
    }

    #[inline]
    pub fn index_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.index_host).map_err(|_| ConfigError::InvalidUrl(self.index_host.clone()))
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}
