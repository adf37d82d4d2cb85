//! Certification resolution: rule hints, model suggestions, and
//! evidence-implied candidates run through one state machine.
//!
//! Every candidate starts Proposed and ends Confirmed, Optional, or
//! Discarded. Rule-sourced candidates are authoritative: they are always
//! Confirmed and keep their mandatory flag and priority untouched. The
//! model may add candidates and refine cost or timeline, never promote
//! anything to mandatory. Discarding needs both weak evidence and an
//! explicit model rule-out.

use std::sync::Arc;
use std::time::Duration;

use exportready_core::category::ProductCategory;
use exportready_core::types::{
    Certification, CertificationType, Degradation, DegradedComponent, EstimateProvenance, Money,
    MoneyRange, Priority, QueryInput, Resolution,
};
use exportready_rag::RetrievedEvidence;
use exportready_rules::{CertificationHint, RuleEngine};
use serde::Deserialize;

use crate::backend::{CompletionRequest, GenerativeBackend};
use crate::config::{PipelineConfig, ResolverConfig};
use crate::fusion::{Agreement, FusionSignals, ScoreFusion, WeightedFusion};
use crate::prompts;
use crate::structured::complete_structured_with_retry;

/// Estimate used when neither the lookup table nor the model offers one.
const DEFAULT_TIMELINE_DAYS: u32 = 30;
const DEFAULT_COST_MAX_INR: u64 = 50_000;

#[derive(Debug, Deserialize)]
struct ModelCertResponse {
    #[serde(default)]
    certifications: Vec<ModelCertSuggestion>,
    #[serde(default)]
    ruled_out: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ModelCertSuggestion {
    name: String,
    #[serde(default)]
    certification_type: String,
    #[serde(default)]
    mandatory: bool,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    estimated_cost_min: Option<u64>,
    #[serde(default)]
    estimated_cost_max: Option<u64>,
    #[serde(default)]
    estimated_days: Option<u32>,
}

/// Model-sourced cost/timeline refinement, keyed back to candidates by
/// certification type.
#[derive(Debug, Clone)]
struct ModelEstimate {
    cost: Option<MoneyRange>,
    days: Option<u32>,
}

impl ModelCertSuggestion {
    fn estimate(&self) -> Option<ModelEstimate> {
        let cost = match (self.estimated_cost_min, self.estimated_cost_max) {
            (Some(min), Some(max)) => Some(MoneyRange::new(Money::inr(min), Money::inr(max))),
            (Some(value), None) | (None, Some(value)) => Some(MoneyRange::inr(value, value)),
            (None, None) => None,
        };
        if cost.is_none() && self.estimated_days.is_none() {
            return None;
        }
        Some(ModelEstimate {
            cost,
            days: self.estimated_days,
        })
    }
}

/// One candidate moving through the Proposed state.
#[derive(Debug)]
struct Candidate {
    id: String,
    name: String,
    certification_type: CertificationType,
    mandatory: bool,
    priority: Priority,
    rationale: String,
    rule_sourced: bool,
    model_confidence: Option<f32>,
}

/// Resolved certifications plus the degradation record, when the model
/// path failed.
#[derive(Debug)]
pub struct CertificationOutcome {
    pub certifications: Vec<Certification>,
    pub degradation: Option<Degradation>,
}

/// Runs the Proposed → Confirmed/Optional/Discarded state machine for one
/// query.
pub struct CertificationResolver {
    fusion: Arc<dyn ScoreFusion>,
    resolver_config: ResolverConfig,
    model_timeout: Duration,
    retry_backoff: Duration,
}

impl CertificationResolver {
    pub fn new(config: &PipelineConfig) -> CertificationResolver {
        CertificationResolver::with_fusion(
            config,
            Arc::new(WeightedFusion::new(config.fusion.clone())),
        )
    }

    pub fn with_fusion(
        config: &PipelineConfig,
        fusion: Arc<dyn ScoreFusion>,
    ) -> CertificationResolver {
        CertificationResolver {
            fusion,
            resolver_config: config.resolver.clone(),
            model_timeout: config.model_timeout,
            retry_backoff: config.retry_backoff,
        }
    }

    /// Resolve certifications for one query. Never errors: a failed model
    /// call degrades to rule and evidence candidates only.
    pub async fn resolve(
        &self,
        backend: &dyn GenerativeBackend,
        rules: &RuleEngine,
        query: &QueryInput,
        category: ProductCategory,
        hints: &[CertificationHint],
        evidence: &[RetrievedEvidence],
    ) -> CertificationOutcome {
        let request = CompletionRequest::new(
            &prompts::certification_system_prompt(),
            &prompts::certification_user_prompt(query, category, hints, evidence),
        );

        let (model, degradation) = match complete_structured_with_retry::<ModelCertResponse>(
            backend,
            &request,
            self.model_timeout,
            self.retry_backoff,
        )
        .await
        {
            Ok(response) => (response, None),
            Err(error) => (
                ModelCertResponse {
                    certifications: Vec::new(),
                    ruled_out: Vec::new(),
                },
                Some(Degradation {
                    component: DegradedComponent::CertificationModel,
                    reason: error.to_string(),
                }),
            ),
        };

        let candidates = self.collect_candidates(query, hints, &model, evidence);
        let certifications = self.settle(rules, query, candidates, &model, evidence);

        CertificationOutcome {
            certifications,
            degradation,
        }
    }

    /// Gather candidates in authority order: rules, then model
    /// suggestions, then types the evidence mentions that nothing else
    /// covered. Physical-goods schemes are skipped for non-goods
    /// exporters unless a rule proposed them.
    fn collect_candidates(
        &self,
        query: &QueryInput,
        hints: &[CertificationHint],
        model: &ModelCertResponse,
        evidence: &[RetrievedEvidence],
    ) -> Vec<Candidate> {
        let ships_goods = query.business_type.ships_goods();
        let mut candidates: Vec<Candidate> = hints
            .iter()
            .map(|hint| Candidate {
                id: hint.certification_id.clone(),
                name: hint.name.clone(),
                certification_type: hint.certification_type.clone(),
                mandatory: hint.mandatory,
                priority: hint.priority,
                rationale: hint.rationale.clone(),
                rule_sourced: true,
                model_confidence: None,
            })
            .collect();

        for suggestion in &model.certifications {
            let name = suggestion.name.trim();
            if name.is_empty() {
                continue;
            }
            let certification_type = suggestion_type(suggestion);
            if covered(&candidates, &certification_type, name) {
                continue;
            }
            if !ships_goods && certification_type.is_physical_goods_scheme() {
                continue;
            }
            candidates.push(Candidate {
                id: slugify(name),
                name: name.to_string(),
                certification_type,
                mandatory: false,
                // A suggestion the model calls legally required still lands
                // below every rule-sourced priority.
                priority: if suggestion.mandatory {
                    Priority::Medium
                } else {
                    Priority::Low
                },
                rationale: if suggestion.rationale.trim().is_empty() {
                    format!("Suggested for exports to {}", query.destination_country)
                } else {
                    suggestion.rationale.trim().to_string()
                },
                rule_sourced: false,
                model_confidence: Some(suggestion.confidence.clamp(0.0, 1.0)),
            });
        }

        for item in evidence {
            let Some(certification_type) = item.chunk.certification_type.clone() else {
                continue;
            };
            let label = certification_type.as_str().to_uppercase();
            let name = format!("{label} compliance requirement");
            if covered(&candidates, &certification_type, &name) {
                continue;
            }
            if !ships_goods && certification_type.is_physical_goods_scheme() {
                continue;
            }
            candidates.push(Candidate {
                id: slugify(&name),
                name,
                certification_type,
                mandatory: false,
                priority: Priority::Low,
                rationale: format!(
                    "Regulatory references for {} mention {label} obligations",
                    query.destination_country
                ),
                rule_sourced: false,
                model_confidence: None,
            });
        }

        candidates
    }

    /// Run the state machine and build the surviving certifications.
    fn settle(
        &self,
        rules: &RuleEngine,
        query: &QueryInput,
        candidates: Vec<Candidate>,
        model: &ModelCertResponse,
        evidence: &[RetrievedEvidence],
    ) -> Vec<Certification> {
        let mut certifications = Vec::new();
        for candidate in candidates {
            let resolution = self.resolve_candidate(&candidate, model, evidence);
            if resolution == Resolution::Discarded {
                continue;
            }

            let (cost, days, provenance) =
                self.cost_and_timeline(rules, &candidate, &query.destination_country, model);

            certifications.push(Certification {
                id: candidate.id,
                name: candidate.name,
                evidence_refs: matching_chunk_ids(&candidate.certification_type, evidence),
                certification_type: candidate.certification_type,
                mandatory: candidate.mandatory,
                priority: candidate.priority,
                estimated_cost: cost,
                estimated_timeline_days: days,
                provenance,
                rationale: candidate.rationale,
            });
        }
        certifications
    }

    fn resolve_candidate(
        &self,
        candidate: &Candidate,
        model: &ModelCertResponse,
        evidence: &[RetrievedEvidence],
    ) -> Resolution {
        if candidate.rule_sourced {
            return Resolution::Confirmed;
        }

        let retrieval = best_matching_similarity(&candidate.certification_type, evidence);
        let signals = FusionSignals {
            rule: None,
            retrieval,
            model: candidate.model_confidence,
            agreement: if retrieval.is_some() && candidate.model_confidence.is_some() {
                Agreement::Agrees
            } else {
                Agreement::Unknown
            },
        };
        let score = self.fusion.fuse(&signals);

        if score >= self.resolver_config.confirm_threshold {
            Resolution::Confirmed
        } else if score < self.resolver_config.discard_threshold
            && is_ruled_out(candidate, &model.ruled_out)
        {
            Resolution::Discarded
        } else {
            Resolution::Optional
        }
    }

    /// Table entry wins; a model estimate fills gaps; a flat default
    /// covers the rest. Only the table counts as verified.
    fn cost_and_timeline(
        &self,
        rules: &RuleEngine,
        candidate: &Candidate,
        country: &str,
        model: &ModelCertResponse,
    ) -> (MoneyRange, u32, EstimateProvenance) {
        if let Some(entry) = rules.cost_timeline(&candidate.id, country) {
            return (entry.cost, entry.timeline_days.max(1), EstimateProvenance::Verified);
        }

        let estimate = model
            .certifications
            .iter()
            .filter(|s| suggestion_type(s) == candidate.certification_type)
            .find_map(|s| s.estimate());
        match estimate {
            Some(estimate) => (
                estimate
                    .cost
                    .unwrap_or_else(|| MoneyRange::inr(0, DEFAULT_COST_MAX_INR)),
                estimate.days.unwrap_or(DEFAULT_TIMELINE_DAYS).max(1),
                EstimateProvenance::Estimated,
            ),
            None => (
                MoneyRange::inr(0, DEFAULT_COST_MAX_INR),
                DEFAULT_TIMELINE_DAYS,
                EstimateProvenance::Estimated,
            ),
        }
    }
}

fn suggestion_type(suggestion: &ModelCertSuggestion) -> CertificationType {
    let raw = suggestion.certification_type.trim();
    if raw.is_empty() {
        CertificationType::Other(slugify(&suggestion.name))
    } else {
        CertificationType::parse(raw)
    }
}

/// True when an existing candidate already represents this scheme. Known
/// types match by type; `Other` schemes match by slugified name.
fn covered(candidates: &[Candidate], certification_type: &CertificationType, name: &str) -> bool {
    candidates.iter().any(|c| match certification_type {
        CertificationType::Other(_) => slugify(&c.name) == slugify(name),
        _ => c.certification_type == *certification_type,
    })
}

fn best_matching_similarity(
    certification_type: &CertificationType,
    evidence: &[RetrievedEvidence],
) -> Option<f32> {
    evidence
        .iter()
        .filter(|e| e.chunk.certification_type.as_ref() == Some(certification_type))
        .map(|e| e.similarity)
        .fold(None, |best, s| match best {
            Some(b) if b >= s => Some(b),
            _ => Some(s),
        })
}

fn matching_chunk_ids(
    certification_type: &CertificationType,
    evidence: &[RetrievedEvidence],
) -> Vec<String> {
    evidence
        .iter()
        .filter(|e| e.chunk.certification_type.as_ref() == Some(certification_type))
        .map(|e| e.chunk.id.clone())
        .collect()
}

fn is_ruled_out(candidate: &Candidate, ruled_out: &[String]) -> bool {
    ruled_out.iter().any(|entry| {
        let entry = entry.trim().to_lowercase();
        entry == candidate.name.to_lowercase()
            || entry == candidate.certification_type.as_str().to_lowercase()
    })
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use async_trait::async_trait;
    use exportready_core::types::{BusinessType, CompanySize};
    use exportready_rag::KnowledgeChunk;
    use exportready_rules::RuleTable;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        responses: Mutex<VecDeque<String>>,
    }

    impl Scripted {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl GenerativeBackend for Scripted {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, BackendError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BackendError::Network("script exhausted".to_string()))
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig {
            retry_backoff: Duration::from_millis(1),
            ..PipelineConfig::default()
        }
    }

    fn synthetic_rules() -> RuleEngine {
        let table = RuleTable::from_toml_str(
            r#"
            version = "test.1"

            [[certification_rules]]
            id = "us-fda-facility"
            name = "FDA Facility Registration"
            certification_type = "fda"
            categories = ["food"]
            countries = ["US"]
            business_types = ["*"]
            mandatory = true
            priority = "high"
            rationale = "US food imports require facility registration"

            [[cost_entries]]
            certification_id = "us-fda-facility"
            countries = ["US"]
            min_cost = 15000
            max_cost = 40000
            timeline_days = 30
            "#,
        )
        .unwrap();
        RuleEngine::new(Arc::new(table))
    }

    fn food_query() -> QueryInput {
        QueryInput {
            product_name: "Organic Turmeric Powder".to_string(),
            ingredients: None,
            image_summary: None,
            destination_country: "US".to_string(),
            business_type: BusinessType::Manufacturing,
            company_size: CompanySize::Micro,
            monthly_volume: None,
            price_range: None,
            payment_mode: None,
        }
    }

    fn saas_query() -> QueryInput {
        QueryInput {
            product_name: "Cloud Accounting Software".to_string(),
            ingredients: None,
            image_summary: None,
            destination_country: "GB".to_string(),
            business_type: BusinessType::SaaS,
            company_size: CompanySize::Small,
            monthly_volume: None,
            price_range: None,
            payment_mode: None,
        }
    }

    fn fda_hint() -> CertificationHint {
        CertificationHint::new(
            "us-fda-facility",
            "FDA Facility Registration",
            CertificationType::Fda,
            true,
            Priority::High,
            "US food imports require facility registration",
        )
    }

    fn typed_evidence(
        id: &str,
        certification_type: CertificationType,
        similarity: f32,
    ) -> RetrievedEvidence {
        RetrievedEvidence {
            chunk: KnowledgeChunk {
                id: id.to_string(),
                source: format!("{id} source"),
                text: "Relevant regulatory text.".to_string(),
                regulation: None,
                country: None,
                certification_type: Some(certification_type),
                ingested_at: 1_700_000_000,
            },
            similarity,
            rank: 1,
        }
    }

    const EMPTY_MODEL: &str = r#"{"certifications": [], "ruled_out": []}"#;

    // ==================== Rule authority ====================

    #[tokio::test]
    async fn rule_hint_is_confirmed_with_verified_costs() {
        let backend = Scripted::new(&[EMPTY_MODEL]);
        let resolver = CertificationResolver::new(&fast_config());
        let outcome = resolver
            .resolve(
                &backend,
                &synthetic_rules(),
                &food_query(),
                ProductCategory::Food,
                &[fda_hint()],
                &[typed_evidence("fda-0", CertificationType::Fda, 0.8)],
            )
            .await;

        assert!(outcome.degradation.is_none());
        let cert = &outcome.certifications[0];
        assert_eq!(cert.id, "us-fda-facility");
        assert!(cert.mandatory);
        assert_eq!(cert.priority, Priority::High);
        assert_eq!(cert.provenance, EstimateProvenance::Verified);
        assert_eq!(cert.estimated_cost.min.amount, 15_000);
        assert_eq!(cert.estimated_timeline_days, 30);
        assert_eq!(cert.evidence_refs, vec!["fda-0".to_string()]);
    }

    #[tokio::test]
    async fn model_cannot_promote_to_mandatory() {
        let backend = Scripted::new(&[
            r#"{"certifications": [{"name": "UKCA Marking", "certification_type": "ukca", "mandatory": true, "confidence": 0.9, "rationale": "Required for GB"}], "ruled_out": []}"#,
        ]);
        let resolver = CertificationResolver::new(&fast_config());
        let outcome = resolver
            .resolve(
                &backend,
                &synthetic_rules(),
                &saas_query(),
                ProductCategory::Software,
                &[],
                &[],
            )
            .await;

        let cert = &outcome.certifications[0];
        assert_eq!(cert.name, "UKCA Marking");
        assert!(!cert.mandatory);
        assert!(cert.priority <= Priority::Medium);
        assert_eq!(cert.provenance, EstimateProvenance::Estimated);
    }

    #[tokio::test]
    async fn model_duplicate_of_rule_hint_is_skipped() {
        let backend = Scripted::new(&[
            r#"{"certifications": [{"name": "FDA Registration (again)", "certification_type": "fda", "confidence": 0.9}], "ruled_out": []}"#,
        ]);
        let resolver = CertificationResolver::new(&fast_config());
        let outcome = resolver
            .resolve(
                &backend,
                &synthetic_rules(),
                &food_query(),
                ProductCategory::Food,
                &[fda_hint()],
                &[],
            )
            .await;

        assert_eq!(outcome.certifications.len(), 1);
        assert_eq!(outcome.certifications[0].id, "us-fda-facility");
    }

    // ==================== Cost refinement ====================

    #[tokio::test]
    async fn model_estimate_fills_missing_table_entry() {
        let backend = Scripted::new(&[
            r#"{"certifications": [{"name": "Halal Certificate", "certification_type": "halal", "confidence": 0.8, "estimated_cost_min": 60000, "estimated_cost_max": 20000, "estimated_days": 45}], "ruled_out": []}"#,
        ]);
        let resolver = CertificationResolver::new(&fast_config());
        let outcome = resolver
            .resolve(
                &backend,
                &synthetic_rules(),
                &food_query(),
                ProductCategory::Food,
                &[],
                &[typed_evidence("halal-0", CertificationType::Halal, 0.7)],
            )
            .await;

        let cert = &outcome.certifications[0];
        assert_eq!(cert.provenance, EstimateProvenance::Estimated);
        // Inverted bounds from the model are swapped, not discarded.
        assert_eq!(cert.estimated_cost.min.amount, 20_000);
        assert_eq!(cert.estimated_cost.max.amount, 60_000);
        assert_eq!(cert.estimated_timeline_days, 45);
        assert!(cert.is_valid());
    }

    #[tokio::test]
    async fn missing_estimates_fall_back_to_defaults() {
        let backend = Scripted::new(&[
            r#"{"certifications": [{"name": "Packaging Declaration", "certification_type": "", "confidence": 0.8}], "ruled_out": []}"#,
        ]);
        let resolver = CertificationResolver::new(&fast_config());
        let outcome = resolver
            .resolve(
                &backend,
                &synthetic_rules(),
                &food_query(),
                ProductCategory::Food,
                &[],
                &[],
            )
            .await;

        let cert = &outcome.certifications[0];
        assert_eq!(cert.estimated_timeline_days, DEFAULT_TIMELINE_DAYS);
        assert_eq!(cert.estimated_cost.max.amount, DEFAULT_COST_MAX_INR);
        assert!(matches!(cert.certification_type, CertificationType::Other(_)));
    }

    // ==================== State machine ====================

    #[tokio::test]
    async fn evidence_implied_candidate_survives_without_model_mention() {
        let backend = Scripted::new(&[EMPTY_MODEL]);
        let resolver = CertificationResolver::new(&fast_config());
        let outcome = resolver
            .resolve(
                &backend,
                &synthetic_rules(),
                &saas_query(),
                ProductCategory::Software,
                &[],
                &[typed_evidence("softex-0", CertificationType::Softex, 0.8)],
            )
            .await;

        let cert = &outcome.certifications[0];
        assert_eq!(cert.certification_type, CertificationType::Softex);
        assert!(!cert.mandatory);
        assert_eq!(cert.evidence_refs, vec!["softex-0".to_string()]);
    }

    #[tokio::test]
    async fn ruled_out_with_weak_evidence_is_discarded() {
        let backend = Scripted::new(&[r#"{"certifications": [], "ruled_out": ["gots"]}"#]);
        let resolver = CertificationResolver::new(&fast_config());
        let outcome = resolver
            .resolve(
                &backend,
                &synthetic_rules(),
                &food_query(),
                ProductCategory::Food,
                &[],
                &[typed_evidence("gots-0", CertificationType::Gots, 0.26)],
            )
            .await;

        assert!(outcome.certifications.is_empty());
    }

    #[tokio::test]
    async fn ruled_out_with_strong_evidence_stays() {
        let backend = Scripted::new(&[r#"{"certifications": [], "ruled_out": ["gots"]}"#]);
        let resolver = CertificationResolver::new(&fast_config());
        let outcome = resolver
            .resolve(
                &backend,
                &synthetic_rules(),
                &food_query(),
                ProductCategory::Food,
                &[],
                &[typed_evidence("gots-0", CertificationType::Gots, 0.9)],
            )
            .await;

        assert_eq!(outcome.certifications.len(), 1);
    }

    #[tokio::test]
    async fn physical_schemes_are_dropped_for_saas() {
        let backend = Scripted::new(&[
            r#"{"certifications": [{"name": "CE Marking", "certification_type": "ce", "confidence": 0.9}], "ruled_out": []}"#,
        ]);
        let resolver = CertificationResolver::new(&fast_config());
        let outcome = resolver
            .resolve(
                &backend,
                &synthetic_rules(),
                &saas_query(),
                ProductCategory::Software,
                &[],
                &[typed_evidence("ce-0", CertificationType::Ce, 0.9)],
            )
            .await;

        assert!(outcome.certifications.is_empty());
    }

    // ==================== Degraded path ====================

    #[tokio::test]
    async fn model_failure_keeps_rule_and_evidence_candidates() {
        let backend = Scripted::new(&[]);
        let resolver = CertificationResolver::new(&fast_config());
        let outcome = resolver
            .resolve(
                &backend,
                &synthetic_rules(),
                &food_query(),
                ProductCategory::Food,
                &[fda_hint()],
                &[typed_evidence("fssai-0", CertificationType::Fssai, 0.8)],
            )
            .await;

        let degradation = outcome.degradation.unwrap();
        assert_eq!(degradation.component, DegradedComponent::CertificationModel);
        assert_eq!(outcome.certifications.len(), 2);
        assert!(outcome.certifications.iter().any(|c| c.mandatory));
    }

    // ==================== Helpers ====================

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("UKCA Marking"), "ukca-marking");
        assert_eq!(slugify("  GS-1 / Barcode!  "), "gs-1-barcode");
    }
}
