//! Deterministic hashing-based embedding provider.
//!
//! Requires no network and no model files: each token is hashed into a
//! bucket of a fixed-size vector, which is then L2-normalized. Identical
//! text always produces identical vectors, which makes this the provider of
//! choice for tests and for air-gapped deployments where semantic recall
//! can be traded for reproducibility.

use std::hash::{Hash, Hasher};

use ahash::AHasher;
use async_trait::async_trait;

use crate::embeddings::provider::{EmbeddingProvider, validate_inputs};
use crate::error::RagError;

const MIN_DIMS: usize = 8;
const MAX_DIMS: usize = 4096;
const DEFAULT_DIMS: usize = 256;

/// Hashing-based embedding provider.
pub struct HashedEmbeddings {
    dims: usize,
}

impl HashedEmbeddings {
    /// Create a provider with the given dimensionality, clamped to
    /// [`MIN_DIMS`]..=[`MAX_DIMS`].
    pub fn new(dims: usize) -> Self {
        Self {
            dims: dims.clamp(MIN_DIMS, MAX_DIMS),
        }
    }

    fn hash_token(&self, token: &str) -> usize {
        // AHasher::default() uses fixed keys, so bucket assignment is
        // stable across processes and platforms.
        let mut hasher = AHasher::default();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dims
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];

        for token in tokenize(text) {
            vector[self.hash_token(&token)] += 1.0;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

impl Default for HashedEmbeddings {
    fn default() -> Self {
        Self::new(DEFAULT_DIMS)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

#[async_trait]
impl EmbeddingProvider for HashedEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        validate_inputs(std::slice::from_ref(&text.to_string()))?;
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        validate_inputs(texts)?;
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn model_name(&self) -> &str {
        "hashed-v1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_text_produces_identical_vectors() {
        let provider = HashedEmbeddings::default();
        let a = provider.embed("organic turmeric powder").await.unwrap();
        let b = provider.embed("organic turmeric powder").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn vectors_are_normalized() {
        let provider = HashedEmbeddings::default();
        let v = provider.embed("LED light bulbs for Germany").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn shared_tokens_increase_similarity() {
        let provider = HashedEmbeddings::default();
        let query = provider.embed("turmeric powder export").await.unwrap();
        let near = provider
            .embed("turmeric powder shipments require FDA registration")
            .await
            .unwrap();
        let far = provider
            .embed("cloud accounting software subscription")
            .await
            .unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&query, &near) > dot(&query, &far));
    }

    #[tokio::test]
    async fn tokenless_text_yields_zero_vector() {
        let provider = HashedEmbeddings::new(16);
        // Punctuation only: survives the empty-input check but has no tokens.
        let v = provider.embed("... --- ...").await.unwrap();
        assert_eq!(v.len(), 16);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let provider = HashedEmbeddings::default();
        assert!(matches!(
            provider.embed("   ").await.unwrap_err(),
            RagError::EmptyInput
        ));
    }

    #[test]
    fn dimensions_are_clamped() {
        assert_eq!(HashedEmbeddings::new(2).dimensions(), 8);
        assert_eq!(HashedEmbeddings::new(10_000).dimensions(), 4096);
        assert_eq!(HashedEmbeddings::new(256).dimensions(), 256);
    }

    #[test]
    fn tokenization_lowercases_and_splits_punctuation() {
        let tokens: Vec<String> = tokenize("FDA-registered Facility, 2024").collect();
        assert_eq!(tokens, vec!["fda", "registered", "facility", "2024"]);
    }
}
