//! Confidence fusion across rule, retrieval, and model signals.
//!
//! The strategy is pluggable so weights can be tuned and tested apart
//! from the orchestration logic. [`WeightedFusion`] is the default: a
//! weighted combination renormalized over the sources that are actually
//! present, with an agreement boost and a disagreement cap applied on top.

use crate::config::FusionConfig;

/// Whether independent sources point at the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agreement {
    /// Rule hint and model output name the same HS chapter (or the same
    /// certification).
    Agrees,
    /// Both sources are present and name different answers.
    Disagrees,
    /// Fewer than two sources present; agreement is undefined.
    Unknown,
}

/// Per-source confidence signals for one fused score.
///
/// `None` means the source produced nothing, which is different from a
/// source reporting zero confidence.
#[derive(Debug, Clone, Copy)]
pub struct FusionSignals {
    pub rule: Option<f32>,
    pub retrieval: Option<f32>,
    pub model: Option<f32>,
    pub agreement: Agreement,
}

impl FusionSignals {
    pub fn none() -> Self {
        Self {
            rule: None,
            retrieval: None,
            model: None,
            agreement: Agreement::Unknown,
        }
    }
}

/// A scoring strategy over fusion signals. Output is always in [0, 1].
pub trait ScoreFusion: Send + Sync {
    fn fuse(&self, signals: &FusionSignals) -> f32;
}

/// Default fusion: weighted combination, renormalized over present
/// sources, never a max or an average.
#[derive(Debug, Clone)]
pub struct WeightedFusion {
    config: FusionConfig,
}

impl WeightedFusion {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }
}

impl Default for WeightedFusion {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}

impl ScoreFusion for WeightedFusion {
    fn fuse(&self, signals: &FusionSignals) -> f32 {
        let mut weighted = 0.0f32;
        let mut weight_sum = 0.0f32;

        if let Some(rule) = signals.rule {
            weighted += self.config.rule_weight * rule.clamp(0.0, 1.0);
            weight_sum += self.config.rule_weight;
        }
        if let Some(retrieval) = signals.retrieval {
            weighted += self.config.retrieval_weight * retrieval.clamp(0.0, 1.0);
            weight_sum += self.config.retrieval_weight;
        }
        if let Some(model) = signals.model {
            weighted += self.config.model_weight * model.clamp(0.0, 1.0);
            weight_sum += self.config.model_weight;
        }

        if weight_sum == 0.0 {
            return 0.0;
        }

        let mut score = weighted / weight_sum;
        match signals.agreement {
            Agreement::Agrees => score += self.config.agreement_boost,
            Agreement::Disagrees => score = score.min(self.config.disagreement_cap),
            Agreement::Unknown => {}
        }
        score.clamp(0.0, 1.0)
    }
}
