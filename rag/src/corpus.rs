//! Corpus loading, chunking, and ingestion.
//!
//! Documents are split into paragraph-sized chunks before embedding. A
//! built-in seed corpus of Indian export guidance ships with the crate so a
//! fresh install can answer queries before any custom ingestion.

use serde::Deserialize;

use exportready_core::types::CertificationType;

use crate::embeddings::EmbeddingProvider;
use crate::error::RagError;
use crate::store::ChunkStore;
use crate::types::KnowledgeChunk;

/// Upper bound on chunk size, in characters.
pub const MAX_CHUNK_CHARS: usize = 1200;

const BUILTIN_CORPUS: &str = include_str!("data/seed_corpus.toml");

/// A corpus of regulatory documents ready for chunking.
#[derive(Debug, Deserialize)]
pub struct SeedCorpus {
    pub version: String,
    #[serde(default)]
    pub documents: Vec<SeedDocument>,
}

/// One source document in a corpus.
#[derive(Debug, Deserialize)]
pub struct SeedDocument {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub regulation: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub certification_type: Option<String>,
    pub text: String,
}

impl SeedCorpus {
    /// Parse a corpus from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, RagError> {
        let corpus: SeedCorpus =
            toml::from_str(raw).map_err(|e| RagError::Corpus(e.to_string()))?;
        if corpus.version.trim().is_empty() {
            return Err(RagError::Corpus("corpus version must be set".to_string()));
        }
        for doc in &corpus.documents {
            if doc.id.trim().is_empty() || doc.source.trim().is_empty() {
                return Err(RagError::Corpus(
                    "corpus documents need an id and a source".to_string(),
                ));
            }
            if doc.text.trim().is_empty() {
                return Err(RagError::Corpus(format!(
                    "corpus document '{}' has no text",
                    doc.id
                )));
            }
        }
        Ok(corpus)
    }

    /// The corpus compiled into the crate. A parse failure here is a
    /// packaging defect, not a runtime condition.
    pub fn builtin() -> Self {
        match Self::from_toml_str(BUILTIN_CORPUS) {
            Ok(corpus) => corpus,
            Err(e) => unreachable!("built-in seed corpus is invalid: {e}"),
        }
    }

    /// Chunk every document into [`KnowledgeChunk`]s stamped with the given
    /// ingestion time.
    pub fn to_chunks(&self, ingested_at: i64) -> Vec<KnowledgeChunk> {
        let mut chunks = Vec::new();
        for doc in &self.documents {
            let cert = doc
                .certification_type
                .as_deref()
                .map(CertificationType::parse);
            for (i, text) in chunk_text(&doc.text, MAX_CHUNK_CHARS).into_iter().enumerate() {
                chunks.push(KnowledgeChunk {
                    id: format!("{}-{i}", doc.id),
                    source: doc.source.clone(),
                    text,
                    regulation: doc.regulation.clone(),
                    country: doc.country.clone(),
                    certification_type: cert.clone(),
                    ingested_at,
                });
            }
        }
        chunks
    }
}

/// Split text into chunks of at most `max_chars` characters.
///
/// Paragraphs are the primary unit. Oversized paragraphs are packed
/// sentence by sentence, and a single run-on sentence is split hard rather
/// than allowed to exceed the cap.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max = max_chars.max(1);
    let mut chunks = Vec::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        if paragraph.chars().count() <= max {
            chunks.push(paragraph.to_string());
            continue;
        }

        let mut current = String::new();
        for sentence in split_sentences(paragraph) {
            let len = sentence.chars().count();
            if len > max {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                chunks.extend(hard_split(sentence, max));
                continue;
            }
            if !current.is_empty() && current.chars().count() + len + 1 > max {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
    }

    chunks
}

fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn hard_split(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max)
        .map(|piece| piece.iter().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Embed and upsert chunks into a store.
pub async fn ingest_chunks(
    store: &ChunkStore,
    provider: &dyn EmbeddingProvider,
    chunks: &[KnowledgeChunk],
) -> Result<usize, RagError> {
    if chunks.is_empty() {
        return Ok(0);
    }
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let embeddings = provider.embed_batch(&texts).await?;
    store.upsert_chunks(chunks, embeddings).await
}

/// Ingest the built-in seed corpus.
pub async fn seed_store(
    store: &ChunkStore,
    provider: &dyn EmbeddingProvider,
) -> Result<usize, RagError> {
    let corpus = SeedCorpus::builtin();
    let chunks = corpus.to_chunks(chrono::Utc::now().timestamp());
    ingest_chunks(store, provider, &chunks).await
}
