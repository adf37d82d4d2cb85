//! exportready-rag: retrieval layer for export compliance evidence
//!
//! This crate provides retrieval-augmented grounding for report
//! generation, including:
//! - LanceDB vector storage for regulatory chunk embeddings
//! - Embedding generation via OpenAI/Ollama, plus a deterministic hashing
//!   provider for offline use
//! - Corpus chunking and ingestion, with a built-in seed corpus
//! - Ranked, similarity-floored evidence retrieval
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use exportready_rag::{ChunkFilters, ChunkStore, HashedEmbeddings, Retriever, corpus};
//!
//! let provider = Arc::new(HashedEmbeddings::default());
//! let store = ChunkStore::open(".exportready/chunks.lance", provider.dimensions()).await?;
//! corpus::seed_store(&store, provider.as_ref()).await?;
//!
//! let retriever = Retriever::new(store, provider);
//! let evidence = retriever
//!     .retrieve("turmeric powder export to the US", &ChunkFilters::for_country("US"))
//!     .await?;
//! ```

pub mod corpus;
pub mod embeddings;
pub mod error;
pub mod retriever;
pub mod store;
pub mod types;

pub use corpus::{SeedCorpus, chunk_text, ingest_chunks, seed_store};
pub use embeddings::{EmbeddingProvider, HashedEmbeddings, OllamaEmbeddings, OpenAiEmbeddings};
pub use error::RagError;
pub use retriever::{Retriever, RetrieverConfig};
pub use store::ChunkStore;
pub use types::{ChunkFilters, KnowledgeChunk, RetrievedEvidence, ScoredChunk};
