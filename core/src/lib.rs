//! # exportready-core
//!
//! Shared domain model for the exportready report engine.
//!
//! This crate defines the value types the pipeline stages exchange:
//!
//! - **Query**: validated exporter input (product, destination, business profile)
//! - **Classification**: HS code predictions with fused confidence
//! - **Compliance**: certifications, risks, roadmap steps, action plans
//! - **Report**: the immutable `ExportReadinessReport` aggregate and its invariants
//!
//! Everything here is pure data plus validation; I/O and inference live in
//! the `rules`, `rag`, and `engine` crates.
//!
//! ## Example
//!
//! ```rust
//! use exportready_core::types::{BusinessType, CompanySize, QueryInput};
//!
//! let query = QueryInput {
//!     product_name: "Organic Turmeric Powder".to_string(),
//!     ingredients: None,
//!     image_summary: None,
//!     destination_country: "United States".to_string(),
//!     business_type: BusinessType::Manufacturing,
//!     company_size: CompanySize::Micro,
//!     monthly_volume: None,
//!     price_range: None,
//!     payment_mode: None,
//! };
//!
//! let validated = query.validated().expect("valid query");
//! assert_eq!(validated.destination_country, "US");
//! ```

pub mod category;
pub mod country;
pub mod types;

// Re-export commonly used types for convenience
pub use category::{ProductCategory, derive_category};
pub use country::{display_name, is_eu_market, normalize_country};
pub use types::{
    BusinessType, Certification, CertificationType, CompanySize, ExportReadinessReport,
    HsCodePrediction, QueryInput, Risk, Severity,
};
