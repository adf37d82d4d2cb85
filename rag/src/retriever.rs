//! Evidence retrieval over the chunk store.
//!
//! Wraps embedding and vector search into a single call that returns
//! ranked, floor-filtered evidence. The store is over-fetched relative to
//! the requested `top_k` so that floor filtering still leaves enough
//! candidates to fill the result.

use std::sync::Arc;

use crate::embeddings::EmbeddingProvider;
use crate::error::RagError;
use crate::store::ChunkStore;
use crate::types::{ChunkFilters, RetrievedEvidence};

/// Tuning knobs for retrieval.
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Number of evidence chunks to return.
    pub top_k: usize,
    /// Minimum similarity for a chunk to count as evidence.
    pub similarity_floor: f32,
    /// Over-fetch factor applied to `top_k` before floor filtering.
    pub oversample: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_floor: 0.25,
            oversample: 4,
        }
    }
}

/// Embeds queries and searches the chunk store for supporting evidence.
pub struct Retriever {
    store: ChunkStore,
    provider: Arc<dyn EmbeddingProvider>,
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(store: ChunkStore, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            provider,
            config: RetrieverConfig::default(),
        }
    }

    pub fn with_config(
        store: ChunkStore,
        provider: Arc<dyn EmbeddingProvider>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Retrieve the best evidence for a query text.
    ///
    /// Results are ordered by similarity, newest chunk first on ties, and
    /// carry 1-based ranks. An empty index yields an empty list, not an
    /// error.
    pub async fn retrieve(
        &self,
        query: &str,
        filters: &ChunkFilters,
    ) -> Result<Vec<RetrievedEvidence>, RagError> {
        let embedding = self.provider.embed(query).await?;
        let fetch = self.config.top_k.saturating_mul(self.config.oversample).max(1);

        let mut scored = self.store.search(&embedding, fetch, filters).await?;
        scored.retain(|s| s.similarity >= self.config.similarity_floor);
        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.chunk.ingested_at.cmp(&a.chunk.ingested_at))
        });
        scored.truncate(self.config.top_k);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(i, s)| RetrievedEvidence {
                chunk: s.chunk,
                similarity: s.similarity,
                rank: i + 1,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashedEmbeddings;
    use crate::types::KnowledgeChunk;

    async fn seeded_retriever(
        dir: &tempfile::TempDir,
        chunks: Vec<KnowledgeChunk>,
        config: RetrieverConfig,
    ) -> Retriever {
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(HashedEmbeddings::new(64));
        let path = dir.path().join("test.lance");
        let store = ChunkStore::open(path.to_str().unwrap(), provider.dimensions())
            .await
            .unwrap();

        if !chunks.is_empty() {
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let embeddings = provider.embed_batch(&texts).await.unwrap();
            store.upsert_chunks(&chunks, embeddings).await.unwrap();
        }

        Retriever::with_config(store, provider, config)
    }

    fn chunk(id: &str, text: &str, ingested_at: i64) -> KnowledgeChunk {
        KnowledgeChunk {
            id: id.to_string(),
            source: "test".to_string(),
            text: text.to_string(),
            regulation: None,
            country: None,
            certification_type: None,
            ingested_at,
        }
    }

    #[tokio::test]
    async fn empty_index_yields_empty_evidence() {
        let dir = tempfile::tempdir().unwrap();
        let retriever = seeded_retriever(&dir, vec![], RetrieverConfig::default()).await;
        let results = retriever
            .retrieve("turmeric export requirements", &ChunkFilters::none())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn overlapping_text_ranks_first() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = vec![
            chunk(
                "near",
                "turmeric powder exports to the US require FDA facility registration",
                100,
            ),
            chunk("far", "cloud accounting software subscriptions", 100),
        ];
        let retriever = seeded_retriever(&dir, chunks, RetrieverConfig::default()).await;

        let results = retriever
            .retrieve("turmeric powder export", &ChunkFilters::none())
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].chunk.id, "near");
        assert_eq!(results[0].rank, 1);
    }

    #[tokio::test]
    async fn similarity_floor_drops_weak_matches() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = vec![
            chunk("exact", "organic turmeric powder", 100),
            chunk("unrelated", "industrial pump machinery spares", 100),
        ];
        let config = RetrieverConfig {
            similarity_floor: 0.9,
            ..RetrieverConfig::default()
        };
        let retriever = seeded_retriever(&dir, chunks, config).await;

        let results = retriever
            .retrieve("organic turmeric powder", &ChunkFilters::none())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, "exact");
    }

    #[tokio::test]
    async fn ties_break_toward_newer_chunks() {
        let dir = tempfile::tempdir().unwrap();
        // Identical text embeds identically, so similarity ties exactly.
        let chunks = vec![
            chunk("old", "softex declaration for software exporters", 100),
            chunk("new", "softex declaration for software exporters", 200),
        ];
        let retriever = seeded_retriever(&dir, chunks, RetrieverConfig::default()).await;

        let results = retriever
            .retrieve("softex declaration", &ChunkFilters::none())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "new");
        assert_eq!(results[1].chunk.id, "old");
    }

    #[tokio::test]
    async fn top_k_caps_result_size() {
        let dir = tempfile::tempdir().unwrap();
        let chunks: Vec<KnowledgeChunk> = (0..10)
            .map(|i| chunk(&format!("c{i}"), &format!("export rule number {i}"), 100))
            .collect();
        let config = RetrieverConfig {
            top_k: 3,
            similarity_floor: 0.0,
            oversample: 4,
        };
        let retriever = seeded_retriever(&dir, chunks, config).await;

        let results = retriever
            .retrieve("export rule", &ChunkFilters::none())
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
