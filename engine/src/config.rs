//! Tuning parameters for the report pipeline.
//!
//! The numeric weights and thresholds here are domain-tuned starting
//! points, not constants of nature. They are carried as plain config
//! structs so deployments can adjust them and tests can pin them.

use std::time::Duration;

/// Weights and thresholds for confidence fusion.
///
/// Source weights order the trust hierarchy: rule agreement above
/// retrieval similarity above the model's self-reported confidence.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    pub rule_weight: f32,
    pub retrieval_weight: f32,
    pub model_weight: f32,

    /// Added when rule hint and model output agree on the HS chapter.
    pub agreement_boost: f32,

    /// Hard ceiling when rule hint and model output disagree on the
    /// chapter; must sit below `verified_threshold`.
    pub disagreement_cap: f32,

    /// Confidence at or above which a prediction counts as verified and
    /// needs no manual review.
    pub verified_threshold: f32,

    /// Ceiling applied when the model was unavailable and the prediction
    /// fell back to rule/retrieval signals alone.
    pub fallback_ceiling: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            rule_weight: 0.5,
            retrieval_weight: 0.3,
            model_weight: 0.2,
            agreement_boost: 0.1,
            disagreement_cap: 0.6,
            verified_threshold: 0.75,
            fallback_ceiling: 0.5,
        }
    }
}

/// Thresholds for the certification candidate state machine.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Fused score at or above which a non-rule candidate is confirmed.
    pub confirm_threshold: f32,

    /// Fused score below which a candidate with no rule backing is
    /// discarded when the model also rules it out.
    pub discard_threshold: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            confirm_threshold: 0.7,
            discard_threshold: 0.3,
        }
    }
}

/// Rejection-rate thresholds for risk severity.
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Historical rejection rate at or above which the risk is High.
    pub high_rejection_threshold: f32,

    /// Historical rejection rate at or above which the risk is Medium.
    pub medium_rejection_threshold: f32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_rejection_threshold: 0.15,
            medium_rejection_threshold: 0.08,
        }
    }
}

/// End-to-end pipeline budget and per-call limits.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Outer deadline for one report. Past it, non-critical stages are
    /// skipped and the report is emitted best-effort.
    pub deadline: Duration,

    /// Timeout for one retrieval round trip.
    pub retrieval_timeout: Duration,

    /// Timeout for one generative model call.
    pub model_timeout: Duration,

    /// Pause before the single retry of a failed external call.
    pub retry_backoff: Duration,

    pub fusion: FusionConfig,
    pub resolver: ResolverConfig,
    pub risk: RiskConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(30),
            retrieval_timeout: Duration::from_secs(5),
            model_timeout: Duration::from_secs(12),
            retry_backoff: Duration::from_millis(500),
            fusion: FusionConfig::default(),
            resolver: ResolverConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}
