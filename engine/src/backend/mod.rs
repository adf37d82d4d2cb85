//! Generative model backends.
//!
//! The pipeline treats the model as an opaque async boundary: a prompt
//! goes in, text comes out, and everything else (timeouts, retries,
//! structured-output parsing) is layered on by the caller.

mod http;

pub use http::{HttpBackend, HttpBackendConfig};

use async_trait::async_trait;

use crate::error::BackendError;

/// One completion request. Prompts are split into a system part (role and
/// output contract) and a user part (the query-specific grounding).
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 1024,
        }
    }
}

/// Opaque generative model boundary.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Run one completion and return the raw response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;

    /// Model identifier recorded on report metadata.
    fn model_id(&self) -> &str;
}
