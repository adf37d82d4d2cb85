use exportready_core::types::{CertificationType, MoneyRange, Priority};
use serde::{Deserialize, Serialize};

/// A certification requirement proposed by the rule table.
///
/// Hints are ground truth when they fire: confidence is pinned to 1.0 and
/// downstream fusion must not dilute a rule-sourced `mandatory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificationHint {
    pub certification_id: String,
    pub name: String,
    pub certification_type: CertificationType,
    pub mandatory: bool,
    pub priority: Priority,
    pub rationale: String,
    pub confidence: f32,
}

impl CertificationHint {
    pub fn new(
        certification_id: &str,
        name: &str,
        certification_type: CertificationType,
        mandatory: bool,
        priority: Priority,
        rationale: &str,
    ) -> CertificationHint {
        CertificationHint {
            certification_id: certification_id.to_string(),
            name: name.to_string(),
            certification_type,
            mandatory,
            priority,
            rationale: rationale.to_string(),
            confidence: 1.0,
        }
    }
}

/// Pre-mapped classification hint for a product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsChapterHint {
    /// Two-digit HS chapter the category usually falls under.
    pub chapter: String,

    /// Representative full code used as the deterministic fallback.
    pub default_code: String,

    pub description: String,
}

/// Verified cost and timeline for one certification in one destination.
#[derive(Debug, Clone)]
pub struct CostTimeline {
    pub cost: MoneyRange,
    pub timeline_days: u32,
}

/// A restricted-substance hit against a destination denylist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenylistHit {
    pub substance: String,
    pub note: String,
}
