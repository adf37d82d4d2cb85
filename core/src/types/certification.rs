use serde::{Deserialize, Serialize};

use crate::types::money::MoneyRange;

/// Certification and declaration families the platform understands.
///
/// `Other` keeps model-suggested schemes we have no first-class handling
/// for; they are never mandatory on their own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CertificationType {
    Fda,
    Ce,
    Bis,
    Zed,
    Softex,
    Reach,
    Fssai,
    Iec,
    Gots,
    Halal,
    Other(String),
}

impl CertificationType {
    pub fn as_str(&self) -> &str {
        match self {
            CertificationType::Fda => "fda",
            CertificationType::Ce => "ce",
            CertificationType::Bis => "bis",
            CertificationType::Zed => "zed",
            CertificationType::Softex => "softex",
            CertificationType::Reach => "reach",
            CertificationType::Fssai => "fssai",
            CertificationType::Iec => "iec",
            CertificationType::Gots => "gots",
            CertificationType::Halal => "halal",
            CertificationType::Other(name) => name.as_str(),
        }
    }

    /// Case-insensitive parse; anything unrecognized becomes `Other` so
    /// model output can introduce schemes the table does not know.
    pub fn parse(value: &str) -> CertificationType {
        match value.trim().to_lowercase().as_str() {
            "fda" => CertificationType::Fda,
            "ce" => CertificationType::Ce,
            "bis" => CertificationType::Bis,
            "zed" => CertificationType::Zed,
            "softex" => CertificationType::Softex,
            "reach" => CertificationType::Reach,
            "fssai" => CertificationType::Fssai,
            "iec" => CertificationType::Iec,
            "gots" => CertificationType::Gots,
            "halal" => CertificationType::Halal,
            other => CertificationType::Other(other.to_string()),
        }
    }

    /// Types that only make sense for physical goods shipments.
    pub fn is_physical_goods_scheme(&self) -> bool {
        matches!(
            self,
            CertificationType::Fda
                | CertificationType::Ce
                | CertificationType::Bis
                | CertificationType::Reach
                | CertificationType::Fssai
                | CertificationType::Gots
                | CertificationType::Halal
        )
    }
}

/// Relative urgency of obtaining a certification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Where a cost/timeline estimate came from.
///
/// `Verified` means the certification+country lookup table; `Estimated`
/// means the generative model filled a gap. Reports render the distinction
/// so users know which numbers to trust.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EstimateProvenance {
    Verified,
    Estimated,
}

/// Outcome of resolving one candidate certification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Confirmed,
    Optional,
    Discarded,
}

/// A resolved certification requirement for the destination market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certification {
    /// Stable identifier, e.g. `"fda-food-facility"`.
    pub id: String,
    pub name: String,
    pub certification_type: CertificationType,
    pub mandatory: bool,
    pub priority: Priority,
    pub estimated_cost: MoneyRange,
    pub estimated_timeline_days: u32,
    pub provenance: EstimateProvenance,

    /// Why this certification applies, in one sentence.
    pub rationale: String,

    /// Chunk ids from the knowledge corpus supporting this requirement.
    #[serde(default)]
    pub evidence_refs: Vec<String>,
}

impl Certification {
    pub fn is_valid(&self) -> bool {
        self.estimated_timeline_days > 0 && self.estimated_cost.is_valid()
    }
}
