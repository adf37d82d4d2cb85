//! exportready-rules: deterministic rule layer
//!
//! This crate holds everything the pipeline can answer without inference:
//! - Certification rules keyed by (category, destination, business type)
//! - HS chapter hints per product category
//! - Verified cost/timeline lookups per certification and destination
//! - Historical rejection rates, restricted-substance denylists
//! - The subsidy catalog
//!
//! All data lives in one versioned TOML table ([`RuleTable`]), loaded once
//! and passed into [`RuleEngine`] at construction. Rule matches are ground
//! truth: hints carry confidence 1.0 and a rule-sourced `mandatory` can
//! never be overridden downstream.
//!
//! # Example
//!
//! ```rust
//! use exportready_core::category::ProductCategory;
//! use exportready_core::types::BusinessType;
//! use exportready_rules::RuleEngine;
//!
//! let engine = RuleEngine::with_builtin_table();
//! let hints = engine.match_certifications(
//!     ProductCategory::Food,
//!     "US",
//!     BusinessType::Manufacturing,
//! );
//! assert!(hints.iter().any(|h| h.mandatory));
//! ```

pub mod engine;
pub mod error;
pub mod table;
pub mod types;

pub use engine::RuleEngine;
pub use error::RuleError;
pub use table::RuleTable;
pub use types::{CertificationHint, CostTimeline, DenylistHit, HsChapterHint};
