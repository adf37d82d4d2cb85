//! # Configuration Management
//!
//! This module handles loading and saving CLI configuration: the
//! generative backend (bring your own model), the embedding provider, and
//! the data directory for the local knowledge index.
//!
//! ## Configuration File Location
//!
//! All platforms: `$HOME/.config/exportready/config.toml`
//!
//! On Windows, uses `%USERPROFILE%\.config\exportready\config.toml` if
//! `$HOME` is not set.
//!
//! ## Backend Configuration
//!
//! Report generation calls a generative model through one of:
//! - OpenAI (GPT-4o and friends)
//! - Anthropic (Claude)
//! - Ollama (local models, the default)
//! - Custom OpenAI-compatible endpoints

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable for overriding the data directory
const DATA_DIR_ENV_VAR: &str = "EXPORTREADY_DATA_DIR";

/// Default Ollama endpoint
const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Default Ollama model used when no backend is configured
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

/// Generative backend configuration
///
/// Stores the configuration for the user's model provider.
///
/// # Supported Providers
///
/// - `openai`: OpenAI API
/// - `anthropic`: Anthropic API
/// - `ollama`: Local Ollama instance (no API key)
/// - `custom`: Custom OpenAI-compatible endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend provider (openai, anthropic, ollama, custom)
    pub provider: String,
    /// API endpoint URL
    pub endpoint: String,
    /// Model name (e.g., gpt-4o-mini, claude-sonnet-4-5, llama3.1)
    pub model: String,
    /// API key stored in the config file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable name for the API key (preferred over api_key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl BackendConfig {
    /// Create a new OpenAI configuration
    pub fn openai(model: &str) -> Self {
        Self {
            provider: "openai".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            model: model.to_string(),
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
        }
    }

    /// Create a new Anthropic configuration
    pub fn anthropic(model: &str) -> Self {
        Self {
            provider: "anthropic".to_string(),
            endpoint: "https://api.anthropic.com/v1".to_string(),
            model: model.to_string(),
            api_key: None,
            api_key_env: Some("ANTHROPIC_API_KEY".to_string()),
        }
    }

    /// Create a new Ollama configuration
    pub fn ollama(endpoint: &str, model: &str) -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: None,
            api_key_env: None,
        }
    }

    /// Create a custom configuration
    pub fn custom(endpoint: &str, model: &str) -> Self {
        Self {
            provider: "custom".to_string(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: None,
            api_key_env: None,
        }
    }

    /// Get the API key from environment or config
    pub fn get_api_key(&self) -> Option<String> {
        // First try environment variable
        if let Some(ref env_var) = self.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Some(key);
            }
        }
        // Fall back to stored key
        self.api_key.clone()
    }

    /// Check if the backend is configured and ready to use
    pub fn is_ready(&self) -> bool {
        // Ollama doesn't require an API key
        if self.provider == "ollama" {
            return true;
        }
        // Other providers require an API key
        self.get_api_key().is_some()
    }

    /// Get a masked version of the API key for display
    pub fn masked_api_key(&self) -> Option<String> {
        self.get_api_key().map(|key| {
            if key.len() > 8 {
                format!("{}...{}", &key[..4], &key[key.len() - 4..])
            } else {
                "****".to_string()
            }
        })
    }
}

/// Embedding provider configuration
///
/// The default is the built-in hashed provider, which needs no network
/// and gives a fresh install a working index. OpenAI or Ollama embeddings
/// can be configured for better retrieval quality; switching providers
/// requires re-ingesting the corpus since stored vectors are not
/// comparable across models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding provider (hashed, openai, ollama)
    pub provider: String,
    /// Model name, for providers that take one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// API endpoint URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Vector dimensions override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    /// Environment variable name for the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hashed".to_string(),
            model: None,
            endpoint: None,
            dimensions: None,
            api_key_env: None,
        }
    }
}

/// CLI configuration
///
/// Stores backend, embedding, and data-directory settings. All fields are
/// optional; a missing config file behaves like an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generative backend configuration (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,
    /// Embedding provider configuration (optional, defaults to hashed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingConfig>,
    /// Directory for the local knowledge index (stored in config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// The configured backend, or the Ollama default when none is set
    pub fn backend_or_default(&self) -> BackendConfig {
        self.backend.clone().unwrap_or_else(default_backend)
    }

    /// The configured embedding provider, or the hashed default
    pub fn embedding_or_default(&self) -> EmbeddingConfig {
        self.embedding.clone().unwrap_or_default()
    }

    /// Get the effective data directory
    ///
    /// Environment variable `EXPORTREADY_DATA_DIR` takes precedence over
    /// the config file, which takes precedence over the platform default.
    pub fn data_dir(&self) -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV_VAR) {
            return PathBuf::from(dir);
        }
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Path of the LanceDB chunk store inside the data directory
    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("chunks.lance")
    }

    /// Check if a backend is configured
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Set the backend configuration
    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Remove the backend configuration
    pub fn remove_backend(&mut self) {
        self.backend = None;
    }

    /// Load configuration from the default config file
    ///
    /// A missing file yields the default configuration; only an unreadable
    /// or unparsable file is an error.
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the default config file
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = config_path()?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Check if a configuration file exists
    pub fn exists() -> bool {
        config_path().map(|p| p.exists()).unwrap_or(false)
    }
}

/// The backend used when none is configured: a local Ollama instance.
fn default_backend() -> BackendConfig {
    BackendConfig::ollama(DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL)
}

/// Get the path to the configuration file
pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs_config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("exportready").join("config.toml"))
}

/// Get the config directory
///
/// Uses `$HOME/.config` on all platforms for consistency.
fn dirs_config_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .or_else(|| std::env::var("USERPROFILE").ok())
                .map(|h| PathBuf::from(h).join(".config"))
        })
}

/// Default data directory, `$HOME/.local/share/exportready`
fn default_data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .or_else(|| std::env::var("USERPROFILE").ok())
                .map(|h| PathBuf::from(h).join(".local").join("share"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
        .join("exportready")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_backend_constructors() {
        let openai = BackendConfig::openai("gpt-4o-mini");
        assert_eq!(openai.provider, "openai");
        assert_eq!(openai.endpoint, "https://api.openai.com/v1");
        assert_eq!(openai.api_key_env.as_deref(), Some("OPENAI_API_KEY"));

        let anthropic = BackendConfig::anthropic("claude-sonnet-4-5");
        assert_eq!(anthropic.api_key_env.as_deref(), Some("ANTHROPIC_API_KEY"));

        let ollama = BackendConfig::ollama("http://localhost:11434", "llama3.1");
        assert_eq!(ollama.provider, "ollama");
        assert!(ollama.api_key_env.is_none());
    }

    #[test]
    fn test_ollama_is_ready_without_key() {
        let ollama = BackendConfig::ollama("http://localhost:11434", "llama3.1");
        assert!(ollama.is_ready());

        // Point at a variable that is surely unset so a developer's real
        // OPENAI_API_KEY cannot leak into the assertion.
        let mut openai = BackendConfig::openai("gpt-4o-mini");
        openai.api_key_env = Some("EXPORTREADY_TEST_UNSET_KEY".to_string());
        assert!(!openai.is_ready());
        openai.api_key = Some("sk-test".to_string());
        assert!(openai.is_ready());
    }

    #[test]
    fn test_api_key_env_takes_precedence() {
        let mut config = BackendConfig::openai("gpt-4o-mini");
        config.api_key = Some("stored-key".to_string());
        config.api_key_env = Some("EXPORTREADY_TEST_BACKEND_KEY".to_string());

        env::set_var("EXPORTREADY_TEST_BACKEND_KEY", "env-key");
        assert_eq!(config.get_api_key().as_deref(), Some("env-key"));

        env::remove_var("EXPORTREADY_TEST_BACKEND_KEY");
        assert_eq!(config.get_api_key().as_deref(), Some("stored-key"));
    }

    #[test]
    fn test_masked_api_key() {
        let mut config = BackendConfig::custom("http://localhost:8080/v1", "local");
        config.api_key = Some("sk_live_abcdef123456".to_string());
        assert_eq!(config.masked_api_key().as_deref(), Some("sk_l...3456"));

        config.api_key = Some("short".to_string());
        assert_eq!(config.masked_api_key().as_deref(), Some("****"));

        config.api_key = None;
        assert!(config.masked_api_key().is_none());
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config::default()
            .with_backend(BackendConfig::anthropic("claude-sonnet-4-5"));

        let toml_text = toml::to_string_pretty(&config).unwrap();
        assert!(toml_text.contains("anthropic"));
        assert!(!toml_text.contains("api_key ="));

        let loaded: Config = toml::from_str(&toml_text).unwrap();
        assert_eq!(loaded.backend.unwrap().model, "claude-sonnet-4-5");
        assert!(loaded.embedding.is_none());
    }

    #[test]
    fn test_empty_config_parses() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.backend.is_none());
        assert_eq!(config.backend_or_default().provider, "ollama");
        assert_eq!(config.embedding_or_default().provider, "hashed");
    }

    #[test]
    fn test_data_dir_precedence() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/exportready-stored")),
            ..Config::default()
        };

        env::set_var(DATA_DIR_ENV_VAR, "/tmp/exportready-env");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/exportready-env"));

        env::remove_var(DATA_DIR_ENV_VAR);
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/exportready-stored"));
        assert_eq!(
            config.store_path(),
            PathBuf::from("/tmp/exportready-stored/chunks.lance")
        );
    }

    #[test]
    fn test_config_exists_does_not_panic() {
        let _ = Config::exists();
    }
}
