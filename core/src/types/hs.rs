use serde::{Deserialize, Serialize};

/// A lower-ranked candidate classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HsCodeAlternative {
    pub code: String,
    pub confidence: f32,
}

/// The predicted Harmonized System classification for a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsCodePrediction {
    /// Digit code, typically 6 or 8 digits, optionally dot-grouped
    /// (`"0910.30"`).
    pub code: String,

    /// Fused confidence in [0, 1]; reflects agreement across rule hints,
    /// retrieval evidence, and model output, not any single source.
    pub confidence: f32,

    pub description: String,

    /// Other plausible codes, ordered by descending confidence.
    #[serde(default)]
    pub alternatives: Vec<HsCodeAlternative>,

    /// Chunk ids from the knowledge corpus supporting this prediction.
    #[serde(default)]
    pub evidence_refs: Vec<String>,

    /// Set when rule hints and model output disagreed on the chapter, or
    /// when the model was unavailable; consumers should route the
    /// classification to a human.
    #[serde(default)]
    pub needs_manual_review: bool,
}

impl HsCodePrediction {
    /// First two digits of the code, the HS chapter.
    pub fn chapter(&self) -> Option<&str> {
        hs_chapter(&self.code)
    }
}

/// Extract the 2-digit chapter from an HS code string, ignoring dot
/// grouping. Returns `None` when the string does not start with two digits.
pub fn hs_chapter(code: &str) -> Option<&str> {
    let trimmed = code.trim();
    if trimmed.len() >= 2 && trimmed[..2].chars().all(|c| c.is_ascii_digit()) {
        Some(&trimmed[..2])
    } else {
        None
    }
}
