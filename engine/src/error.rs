//! Error taxonomy for report generation.
//!
//! Only two classes abort a report: invalid input, and an inconsistency
//! the assembler cannot correct. Retrieval and model failures degrade the
//! report instead and are recorded on it as [`Degradation`] entries.
//!
//! [`Degradation`]: exportready_core::types::Degradation

use thiserror::Error;

use exportready_core::types::{QueryValidationError, ReportIntegrityError};
use exportready_rag::RagError;
use exportready_rules::RuleError;

/// Errors from generative backend calls.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API key not found. Set the {env_var} environment variable")]
    MissingApiKey { env_var: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse model output: {0}")]
    Parse(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Model call timed out after {0}ms")]
    Timeout(u128),
}

/// Top-level pipeline failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid query: {0}")]
    Input(#[from] QueryValidationError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RagError),

    #[error("model inference failed: {0}")]
    ModelInference(#[from] BackendError),

    #[error("rule table error: {0}")]
    Rules(#[from] RuleError),

    #[error("inconsistent report data: {0}")]
    InconsistentData(#[from] ReportIntegrityError),
}
