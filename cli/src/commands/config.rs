//! # Config Command
//!
//! Manages CLI configuration, including the generative backend used by
//! the `assess` command.
//!
//! ## Usage
//!
//! ```bash
//! # Show current configuration
//! exportready config show
//!
//! # Configure OpenAI as the report backend
//! exportready config backend openai --model gpt-4o-mini
//!
//! # Configure Anthropic
//! exportready config backend anthropic --model claude-sonnet-4-5
//!
//! # Configure local Ollama
//! exportready config backend ollama --endpoint http://localhost:11434 --model llama3.1
//!
//! # Configure a custom OpenAI-compatible endpoint
//! exportready config backend custom --endpoint https://api.example.com/v1 --model custom-model
//!
//! # Show current backend configuration
//! exportready config backend show
//!
//! # Remove backend configuration
//! exportready config backend remove
//! ```

use anyhow::Result;
use colored::Colorize;

use crate::config::{config_path, BackendConfig, Config};
use crate::exit_codes::*;

/// Backend provider choices for configuration
#[derive(Debug, Clone)]
pub enum BackendProvider {
    /// OpenAI API
    OpenAi {
        model: String,
        api_key: Option<String>,
    },
    /// Anthropic API (Claude models)
    Anthropic {
        model: String,
        api_key: Option<String>,
    },
    /// Local Ollama instance
    Ollama { endpoint: String, model: String },
    /// Custom OpenAI-compatible endpoint
    Custom {
        endpoint: String,
        model: String,
        api_key: Option<String>,
    },
}

/// Arguments for the config show command
#[derive(Debug)]
pub struct ConfigShowArgs {
    /// Show full API key (default: masked)
    pub show_secrets: bool,
}

/// Arguments for the config backend command
#[derive(Debug)]
pub enum ConfigBackendArgs {
    /// Configure a backend provider
    Set(BackendProvider),
    /// Show current backend configuration
    Show { show_secrets: bool },
    /// Remove backend configuration
    Remove,
}

/// Execute the config show command
///
/// Displays all current configuration settings.
pub fn execute_show(args: ConfigShowArgs) -> Result<i32> {
    let config = Config::load()?;

    println!();
    println!("{}", "ExportReady Configuration".bold().underline());
    println!();

    if let Ok(path) = config_path() {
        let status = if path.exists() {
            String::new()
        } else {
            format!(" {}", "(not created yet)".dimmed())
        };
        println!("  {} {}{}", "Config file:".dimmed(), path.display(), status);
    }
    println!();

    // Knowledge index
    println!("{}", "Knowledge Index".cyan().bold());
    println!("  {} {}", "Data dir:".dimmed(), config.data_dir().display());
    let embedding = config.embedding_or_default();
    print!("  {} {}", "Embeddings:".dimmed(), embedding.provider);
    if let Some(model) = &embedding.model {
        print!(" ({model})");
    }
    println!();
    println!();

    // Generative backend
    println!("{}", "Generative Backend".cyan().bold());
    if let Some(ref backend) = config.backend {
        print_backend(backend, args.show_secrets);
    } else {
        let default = config.backend_or_default();
        println!(
            "  {} {}",
            "Not configured,".dimmed(),
            format!("defaulting to {} at {}", default.model, default.endpoint).dimmed()
        );
        print_backend_hints();
    }
    println!();

    Ok(EXIT_SUCCESS)
}

/// Execute the config backend command
///
/// Configures, shows, or removes backend settings.
pub fn execute_backend(args: ConfigBackendArgs) -> Result<i32> {
    match args {
        ConfigBackendArgs::Set(provider) => set_backend_config(provider),
        ConfigBackendArgs::Show { show_secrets } => show_backend_config(show_secrets),
        ConfigBackendArgs::Remove => remove_backend_config(),
    }
}

/// Build a [`BackendConfig`] from the selected provider
fn backend_from_provider(provider: BackendProvider) -> BackendConfig {
    match provider {
        BackendProvider::OpenAi { model, api_key } => {
            let mut cfg = BackendConfig::openai(&model);
            if let Some(key) = api_key {
                cfg.api_key = Some(key);
            }
            cfg
        }
        BackendProvider::Anthropic { model, api_key } => {
            let mut cfg = BackendConfig::anthropic(&model);
            if let Some(key) = api_key {
                cfg.api_key = Some(key);
            }
            cfg
        }
        BackendProvider::Ollama { endpoint, model } => BackendConfig::ollama(&endpoint, &model),
        BackendProvider::Custom {
            endpoint,
            model,
            api_key,
        } => {
            let mut cfg = BackendConfig::custom(&endpoint, &model);
            cfg.api_key = api_key;
            cfg
        }
    }
}

/// Set backend configuration
fn set_backend_config(provider: BackendProvider) -> Result<i32> {
    let mut config = Config::load()?;
    let backend = backend_from_provider(provider);

    config.backend = Some(backend.clone());
    config.save()?;

    println!();
    println!("{} Backend configured successfully!", "✓".green().bold());
    println!();
    println!("  {} {}", "Provider:".dimmed(), backend.provider);
    println!("  {} {}", "Model:".dimmed(), backend.model);
    println!("  {} {}", "Endpoint:".dimmed(), backend.endpoint);

    // Check if API key is available
    if !backend.is_ready() {
        println!();
        eprintln!(
            "{} API key not found. Set the {} environment variable.",
            "⚠".yellow().bold(),
            backend.api_key_env.as_deref().unwrap_or("API_KEY")
        );
    } else {
        println!();
        println!("  {} Ready to use with `exportready assess`", "→".cyan());
    }
    println!();

    Ok(EXIT_SUCCESS)
}

/// Show current backend configuration
fn show_backend_config(show_secrets: bool) -> Result<i32> {
    let config = Config::load()?;

    println!();
    println!("{}", "Backend Configuration".bold().underline());
    println!();

    if let Some(ref backend) = config.backend {
        print_backend(backend, show_secrets);
    } else {
        println!("  {}", "Not configured".dimmed());
        print_backend_hints();
    }
    println!();

    Ok(EXIT_SUCCESS)
}

/// Remove backend configuration
fn remove_backend_config() -> Result<i32> {
    let mut config = Config::load()?;

    if config.backend.is_none() {
        println!();
        println!("{} Backend configuration is not set.", "ℹ".blue());
        println!();
        return Ok(EXIT_SUCCESS);
    }

    config.remove_backend();
    config.save()?;

    println!();
    println!("{} Backend configuration removed.", "✓".green().bold());
    println!();

    Ok(EXIT_SUCCESS)
}

fn print_backend(backend: &BackendConfig, show_secrets: bool) {
    println!("  {} {}", "Provider:".dimmed(), backend.provider);
    println!("  {} {}", "Endpoint:".dimmed(), backend.endpoint);
    println!("  {} {}", "Model:".dimmed(), backend.model);

    if let Some(ref env_var) = backend.api_key_env {
        let has_key = std::env::var(env_var).is_ok();
        let status = if has_key {
            "✓ set".green().to_string()
        } else {
            "✗ not set".red().to_string()
        };
        println!("  {} {} ({})", "API Key Env:".dimmed(), env_var, status);
    }

    if backend.api_key.is_some() {
        let display = if show_secrets {
            backend.api_key.clone().unwrap_or_default()
        } else {
            backend.masked_api_key().unwrap_or_else(|| "****".to_string())
        };
        println!("  {} {}", "API Key:".dimmed(), display);
    }

    let ready = if backend.is_ready() {
        "✓ ready".green()
    } else {
        "✗ not ready (API key missing)".red()
    };
    println!("  {} {}", "Status:".dimmed(), ready);
}

fn print_backend_hints() {
    println!();
    println!("  {} Configure with:", "→".cyan());
    println!("    exportready config backend openai --model gpt-4o-mini");
    println!("    exportready config backend anthropic --model claude-sonnet-4-5");
    println!(
        "    exportready config backend ollama --endpoint http://localhost:11434 --model llama3.1"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_keeps_env_fallback() {
        let backend = backend_from_provider(BackendProvider::OpenAi {
            model: "gpt-4o-mini".to_string(),
            api_key: Some("sk-test".to_string()),
        });
        assert_eq!(backend.provider, "openai");
        assert_eq!(backend.api_key.as_deref(), Some("sk-test"));
        assert_eq!(backend.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
    }

    #[test]
    fn test_anthropic_provider_without_stored_key() {
        let backend = backend_from_provider(BackendProvider::Anthropic {
            model: "claude-sonnet-4-5".to_string(),
            api_key: None,
        });
        assert_eq!(backend.provider, "anthropic");
        assert!(backend.api_key.is_none());
        assert_eq!(backend.api_key_env.as_deref(), Some("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_ollama_provider() {
        let backend = backend_from_provider(BackendProvider::Ollama {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
        });
        assert_eq!(backend.provider, "ollama");
        assert_eq!(backend.endpoint, "http://localhost:11434");
        assert!(backend.api_key_env.is_none());
        assert!(backend.is_ready());
    }

    #[test]
    fn test_custom_provider_stores_key_verbatim() {
        let backend = backend_from_provider(BackendProvider::Custom {
            endpoint: "https://api.example.com/v1".to_string(),
            model: "custom-model".to_string(),
            api_key: Some("ck-123".to_string()),
        });
        assert_eq!(backend.provider, "custom");
        assert_eq!(backend.api_key.as_deref(), Some("ck-123"));
        assert!(backend.api_key_env.is_none());
    }
}
