//! HS code prediction: retrieval + rule hint + generative model, fused.
//!
//! The model proposes a code; the rule table's chapter hint arbitrates it.
//! Chapter agreement boosts the fused confidence, disagreement caps it and
//! flags manual review with both codes surfaced. When the model is
//! unavailable the predictor falls back to the rule hint, then to any code
//! quoted in retrieved text, and never fails the report.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use exportready_core::category::ProductCategory;
use exportready_core::types::{
    Degradation, DegradedComponent, HsCodeAlternative, HsCodePrediction, QueryInput, hs_chapter,
};
use exportready_rag::RetrievedEvidence;
use exportready_rules::HsChapterHint;
use regex::Regex;
use serde::Deserialize;

use crate::backend::{CompletionRequest, GenerativeBackend};
use crate::config::{FusionConfig, PipelineConfig};
use crate::fusion::{Agreement, FusionSignals, ScoreFusion, WeightedFusion};
use crate::prompts;
use crate::structured::complete_structured_with_retry;

/// Alternatives kept on a prediction after deduplication.
const MAX_ALTERNATIVES: usize = 4;

/// Placeholder when no rule hint, no model output, and no quoted code
/// exists. Chapter 99 is unused by the Harmonized System.
const UNCLASSIFIED_CODE: &str = "9999.99";

static QUOTED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}\.\d{2}\b|\b\d{6}\b").unwrap());

/// What the model is asked to return for a classification request.
#[derive(Debug, Deserialize)]
struct ModelHsResponse {
    code: String,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    alternatives: Vec<ModelHsAlternative>,
}

#[derive(Debug, Deserialize)]
struct ModelHsAlternative {
    code: String,
    #[serde(default)]
    confidence: f32,
}

/// A prediction plus the degradation record, when the model path failed.
#[derive(Debug)]
pub struct HsOutcome {
    pub prediction: HsCodePrediction,
    pub degradation: Option<Degradation>,
}

/// Fuses rule hints, retrieval evidence, and model output into one
/// classification.
pub struct HsPredictor {
    fusion: Arc<dyn ScoreFusion>,
    config: FusionConfig,
    model_timeout: Duration,
    retry_backoff: Duration,
}

impl HsPredictor {
    pub fn new(config: &PipelineConfig) -> HsPredictor {
        HsPredictor::with_fusion(config, Arc::new(WeightedFusion::new(config.fusion.clone())))
    }

    /// Swap in a different scoring strategy; everything else unchanged.
    pub fn with_fusion(config: &PipelineConfig, fusion: Arc<dyn ScoreFusion>) -> HsPredictor {
        HsPredictor {
            fusion,
            config: config.fusion.clone(),
            model_timeout: config.model_timeout,
            retry_backoff: config.retry_backoff,
        }
    }

    /// Predict the HS code for one product. Never errors: a failed model
    /// call degrades to the rule/retrieval fallback.
    pub async fn predict(
        &self,
        backend: &dyn GenerativeBackend,
        query: &QueryInput,
        category: ProductCategory,
        hint: Option<&HsChapterHint>,
        evidence: &[RetrievedEvidence],
    ) -> HsOutcome {
        let request = CompletionRequest::new(
            &prompts::hs_system_prompt(),
            &prompts::hs_user_prompt(query, category, hint, evidence),
        );

        match complete_structured_with_retry::<ModelHsResponse>(
            backend,
            &request,
            self.model_timeout,
            self.retry_backoff,
        )
        .await
        {
            Ok(model) if !model.code.trim().is_empty() => self.fused(model, hint, evidence),
            Ok(_) => self.fallback(hint, evidence, "model returned an empty code".to_string()),
            Err(error) => self.fallback(hint, evidence, error.to_string()),
        }
    }

    fn fused(
        &self,
        model: ModelHsResponse,
        hint: Option<&HsChapterHint>,
        evidence: &[RetrievedEvidence],
    ) -> HsOutcome {
        let code = model.code.trim().to_string();
        let agreement = match hint {
            None => Agreement::Unknown,
            Some(hint) => match hs_chapter(&code) {
                Some(chapter) if chapter == hint.chapter => Agreement::Agrees,
                Some(_) => Agreement::Disagrees,
                None => Agreement::Unknown,
            },
        };

        let signals = FusionSignals {
            rule: hint.map(|_| 1.0),
            retrieval: evidence.first().map(|e| e.similarity),
            model: Some(model.confidence.clamp(0.0, 1.0)),
            agreement,
        };
        let confidence = self.fusion.fuse(&signals);

        let mut alternatives: Vec<HsCodeAlternative> = model
            .alternatives
            .into_iter()
            .filter(|a| !a.code.trim().is_empty() && a.code.trim() != code)
            .map(|a| HsCodeAlternative {
                code: a.code.trim().to_string(),
                confidence: a.confidence.clamp(0.0, 1.0),
            })
            .collect();
        if agreement == Agreement::Disagrees {
            if let Some(hint) = hint {
                if hint.default_code != code {
                    alternatives.push(HsCodeAlternative {
                        code: hint.default_code.clone(),
                        confidence,
                    });
                }
            }
        }
        alternatives.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut seen = std::collections::HashSet::new();
        alternatives.retain(|a| seen.insert(a.code.clone()));
        alternatives.truncate(MAX_ALTERNATIVES);

        let description = if model.description.trim().is_empty() {
            hint.map(|h| h.description.clone())
                .unwrap_or_else(|| "Unverified classification".to_string())
        } else {
            model.description.trim().to_string()
        };

        HsOutcome {
            prediction: HsCodePrediction {
                code,
                confidence,
                description,
                alternatives,
                evidence_refs: evidence_ids(evidence),
                needs_manual_review: agreement == Agreement::Disagrees
                    || confidence < self.config.verified_threshold,
            },
            degradation: None,
        }
    }

    /// Model-free prediction from the rule hint or retrieved text, with
    /// confidence held at or below the fallback ceiling.
    fn fallback(
        &self,
        hint: Option<&HsChapterHint>,
        evidence: &[RetrievedEvidence],
        reason: String,
    ) -> HsOutcome {
        let signals = FusionSignals {
            rule: hint.map(|_| 1.0),
            retrieval: evidence.first().map(|e| e.similarity),
            model: None,
            agreement: Agreement::Unknown,
        };
        let confidence = self.fusion.fuse(&signals).min(self.config.fallback_ceiling);

        let (code, description) = if let Some(hint) = hint {
            (hint.default_code.clone(), hint.description.clone())
        } else if let Some((code, source)) = quoted_code(evidence) {
            (code, format!("Code cited in {source}"))
        } else {
            (
                UNCLASSIFIED_CODE.to_string(),
                "Unclassified; no rule hint or reference code available".to_string(),
            )
        };

        HsOutcome {
            prediction: HsCodePrediction {
                code,
                confidence,
                description,
                alternatives: Vec::new(),
                evidence_refs: evidence_ids(evidence),
                needs_manual_review: true,
            },
            degradation: Some(Degradation {
                component: DegradedComponent::HsModel,
                reason,
            }),
        }
    }
}

fn evidence_ids(evidence: &[RetrievedEvidence]) -> Vec<String> {
    evidence.iter().map(|e| e.chunk.id.clone()).collect()
}

/// First HS-shaped code quoted in the retrieved text, best-ranked chunk
/// first.
fn quoted_code(evidence: &[RetrievedEvidence]) -> Option<(String, String)> {
    for item in evidence {
        if let Some(found) = QUOTED_CODE.find(&item.chunk.text) {
            return Some((found.as_str().to_string(), item.chunk.source.clone()));
        }
    }
    None
}
