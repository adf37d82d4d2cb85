use exportready_core::types::{CertificationType, Evidence};
use serde::{Deserialize, Serialize};

/// A chunk of regulatory text stored in the vector database.
///
/// Created at corpus ingestion time and read-only afterwards. The embedding
/// vector itself lives in the store's vector column, keyed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Stable chunk id, unique across the corpus. Re-ingesting the same id
    /// replaces the stored chunk.
    pub id: String,

    /// Source document identifier (regulation name, circular number, guide).
    pub source: String,

    /// The text span.
    pub text: String,

    /// Regulation or scheme this chunk describes, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regulation: Option<String>,

    /// Destination country the text applies to, ISO alpha-2. `None` means
    /// the text is not country-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Certification family the text concerns, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification_type: Option<CertificationType>,

    /// Ingestion time, epoch seconds. Breaks similarity ties in favor of
    /// fresher regulatory text.
    pub ingested_at: i64,
}

/// Metadata filters applied before similarity ranking.
///
/// A filter narrows to chunks matching the value or carrying no value for
/// that field: country-agnostic guidance stays retrievable for every
/// destination.
#[derive(Debug, Clone, Default)]
pub struct ChunkFilters {
    pub country: Option<String>,
    pub certification_type: Option<CertificationType>,
}

impl ChunkFilters {
    pub fn none() -> ChunkFilters {
        ChunkFilters::default()
    }

    pub fn for_country(country: &str) -> ChunkFilters {
        ChunkFilters {
            country: Some(country.to_string()),
            certification_type: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.country.is_none() && self.certification_type.is_none()
    }
}

/// A chunk with its similarity score from vector search, before ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: KnowledgeChunk,
    pub similarity: f32,
}

/// A ranked retrieval result, ephemeral to one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedEvidence {
    pub chunk: KnowledgeChunk,
    pub similarity: f32,
    /// 1-based rank after floor filtering and tie-breaking.
    pub rank: usize,
}

impl RetrievedEvidence {
    /// Convert into the citation form carried on reports.
    pub fn to_evidence(&self) -> Evidence {
        Evidence {
            chunk_id: self.chunk.id.clone(),
            source: self.chunk.source.clone(),
            snippet: self.chunk.text.clone(),
            country: self.chunk.country.clone(),
            certification_type: self.chunk.certification_type.clone(),
            similarity: self.similarity,
            rank: self.rank,
        }
    }
}
