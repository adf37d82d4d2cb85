//! exportready-engine: the report generation pipeline
//!
//! This crate turns a validated product query into a full export-readiness
//! report. One `ReportEngine` wires together:
//! - concurrent evidence retrieval for classification and certifications
//! - rule lookups that anchor both model stages
//! - structured HS code prediction and certification resolution against a
//!   generative backend, with confidence fusion across rule, retrieval,
//!   and model signals
//! - deterministic risk analysis, roadmap ordering, and a day-by-day
//!   action plan
//! - report assembly with cross-section consistency checks
//!
//! External calls (retrieval, model completions) carry per-call timeouts
//! and a single retry; when they still fail the pipeline degrades the
//! affected section, records it in the report, and keeps going. Invalid
//! input and irreparable inconsistencies are the only hard errors.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use exportready_engine::{HttpBackend, HttpBackendConfig, ReportEngine};
//! use exportready_rag::{ChunkStore, HashedEmbeddings, Retriever};
//! use exportready_rules::RuleEngine;
//!
//! let provider = Arc::new(HashedEmbeddings::default());
//! let store = ChunkStore::open(".exportready/chunks.lance", provider.dimensions()).await?;
//! let retriever = Arc::new(Retriever::new(store, provider));
//! let backend = Arc::new(HttpBackend::new(HttpBackendConfig::ollama("llama3.1"))?);
//!
//! let engine = ReportEngine::new(RuleEngine::with_builtin_table(), retriever, backend);
//! let report = engine.generate(&query).await?;
//! ```

pub mod assemble;
pub mod backend;
pub mod certifications;
pub mod config;
pub mod error;
pub mod fusion;
pub mod hs;
pub mod pipeline;
pub mod plan;
pub mod prompts;
pub mod risk;
pub mod roadmap;
pub mod structured;

pub use assemble::{ReportParts, assemble_report};
pub use backend::{CompletionRequest, GenerativeBackend, HttpBackend, HttpBackendConfig};
pub use certifications::{CertificationOutcome, CertificationResolver};
pub use config::{FusionConfig, PipelineConfig, ResolverConfig, RiskConfig};
pub use error::{BackendError, EngineError};
pub use fusion::{Agreement, FusionSignals, ScoreFusion, WeightedFusion};
pub use hs::{HsOutcome, HsPredictor};
pub use pipeline::ReportEngine;
pub use plan::build_action_plan;
pub use risk::RiskAnalyzer;
pub use roadmap::build_roadmap;
