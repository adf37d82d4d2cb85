//! Embedding providers for generating vector representations of text.
//!
//! Supports OpenAI-compatible APIs (including Ollama) plus a deterministic
//! hashing provider for offline and test use.

mod hashed;
mod provider;

pub use hashed::HashedEmbeddings;
pub use provider::{EmbeddingProvider, OllamaEmbeddings, OpenAiEmbeddings};
