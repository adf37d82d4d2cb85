use thiserror::Error;

/// Maximum characters accepted per text by embedding providers.
pub const MAX_EMBED_CHARS: usize = 32 * 1024;

/// Errors that can occur in the retrieval layer.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("Text of {chars} chars exceeds the {max} char embedding limit")]
    OversizedInput { chars: usize, max: usize },

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("LanceDB error: {0}")]
    LanceDb(String),

    #[error("Corpus error: {0}")]
    Corpus(String),
}

impl From<lancedb::Error> for RagError {
    fn from(e: lancedb::Error) -> Self {
        RagError::LanceDb(e.to_string())
    }
}
