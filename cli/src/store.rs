//! Knowledge index wiring shared by the assess and ingest commands.
//!
//! Maps the embedding section of the config file onto a concrete provider
//! and opens the LanceDB chunk store in the data directory.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use exportready_rag::{
    ChunkStore, EmbeddingProvider, HashedEmbeddings, OllamaEmbeddings, OpenAiEmbeddings,
    seed_store,
};

use crate::config::Config;

/// Build the embedding provider named by the configuration.
///
/// Fails when an OpenAI provider is configured without a reachable API
/// key, or when the provider name is unknown.
pub fn embedding_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedding = config.embedding_or_default();
    match embedding.provider.as_str() {
        "hashed" => {
            let provider = match embedding.dimensions {
                Some(dims) => HashedEmbeddings::new(dims),
                None => HashedEmbeddings::default(),
            };
            Ok(Arc::new(provider))
        }
        "openai" => {
            let env_var = embedding
                .api_key_env
                .unwrap_or_else(|| "OPENAI_API_KEY".to_string());
            let api_key = std::env::var(&env_var).with_context(|| {
                format!("OpenAI embeddings need an API key in the {env_var} environment variable")
            })?;
            let model = embedding
                .model
                .unwrap_or_else(|| "text-embedding-3-small".to_string());
            Ok(Arc::new(OpenAiEmbeddings::new(
                api_key,
                model,
                embedding.endpoint,
                embedding.dimensions,
            )))
        }
        "ollama" => {
            let model = embedding
                .model
                .unwrap_or_else(|| "nomic-embed-text".to_string());
            Ok(Arc::new(OllamaEmbeddings::new(
                model,
                embedding.endpoint,
                embedding.dimensions,
            )))
        }
        other => bail!("Unknown embedding provider '{other}' (expected hashed, openai, or ollama)"),
    }
}

/// Open the chunk store at the configured path, creating it on first use.
pub async fn open_chunk_store(
    config: &Config,
    provider: &dyn EmbeddingProvider,
) -> Result<ChunkStore> {
    let path = config.store_path();
    ChunkStore::open(&path.to_string_lossy(), provider.dimensions())
        .await
        .with_context(|| format!("Failed to open chunk store at {}", path.display()))
}

/// Seed an empty store with the built-in corpus.
///
/// Returns the number of chunks written, zero when the store already has
/// content.
pub async fn ensure_seeded(
    store: &ChunkStore,
    provider: &dyn EmbeddingProvider,
) -> Result<usize> {
    if store.count().await? > 0 {
        return Ok(0);
    }
    let written = seed_store(store, provider)
        .await
        .context("Failed to seed the knowledge index")?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfig;

    fn config_with_embedding(embedding: EmbeddingConfig) -> Config {
        Config {
            embedding: Some(embedding),
            ..Config::default()
        }
    }

    #[test]
    fn default_provider_is_hashed() {
        let provider = embedding_provider(&Config::default()).unwrap();
        assert_eq!(provider.model_name(), "hashed-v1");
    }

    #[test]
    fn hashed_dimensions_are_configurable() {
        let embedding = EmbeddingConfig {
            dimensions: Some(64),
            ..EmbeddingConfig::default()
        };
        let provider = embedding_provider(&config_with_embedding(embedding)).unwrap();
        assert_eq!(provider.dimensions(), 64);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let embedding = EmbeddingConfig {
            provider: "word2vec".to_string(),
            ..EmbeddingConfig::default()
        };
        let err = embedding_provider(&config_with_embedding(embedding)).err().unwrap();
        assert!(err.to_string().contains("word2vec"));
    }

    #[test]
    fn ollama_provider_uses_configured_model() {
        let embedding = EmbeddingConfig {
            provider: "ollama".to_string(),
            model: Some("mxbai-embed-large".to_string()),
            ..EmbeddingConfig::default()
        };
        let provider = embedding_provider(&config_with_embedding(embedding)).unwrap();
        assert_eq!(provider.model_name(), "mxbai-embed-large");
    }

    #[tokio::test]
    async fn seeding_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        let provider = embedding_provider(&Config::default()).unwrap();
        let path = dir.path().join("chunks.lance");
        let store = ChunkStore::open(&path.to_string_lossy(), provider.dimensions())
            .await
            .unwrap();

        let first = ensure_seeded(&store, provider.as_ref()).await.unwrap();
        assert!(first > 0);
        let second = ensure_seeded(&store, provider.as_ref()).await.unwrap();
        assert_eq!(second, 0);
    }
}
