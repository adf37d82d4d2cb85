use serde::{Deserialize, Serialize};

use crate::types::money::Money;

/// A government incentive the exporter may be eligible for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subsidy {
    /// Stable identifier, e.g. `"zed-subsidy"`.
    pub id: String,
    pub name: String,

    /// Administering body, e.g. "Ministry of MSME".
    pub authority: String,

    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_benefit: Option<Money>,

    /// One-line eligibility summary; full criteria live in the source
    /// scheme documents.
    pub eligibility: String,
}
