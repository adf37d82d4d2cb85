use serde::{Deserialize, Serialize};

use crate::types::certification::CertificationType;

/// A retrieved knowledge chunk cited as support for a prediction or a
/// requirement. Carried on the report in full so a reader can audit where
/// each claim came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// Stable chunk id from the knowledge corpus.
    pub chunk_id: String,

    /// Source document identifier (regulation name, circular number, URL slug).
    pub source: String,

    /// The retrieved text span.
    pub snippet: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification_type: Option<CertificationType>,

    /// Cosine-derived similarity in [0, 1].
    pub similarity: f32,

    /// 1-based rank within the retrieval result it came from.
    pub rank: usize,
}

impl Evidence {
    /// Short form used when building grounding context for model prompts.
    pub fn citation(&self) -> String {
        format!("[{}] {}", self.chunk_id, self.source)
    }
}
