//! Report generation pipeline.
//!
//! One query runs as a single workflow: validate, retrieve evidence for
//! classification and certifications concurrently, look up rules, run the
//! two model stages concurrently, then derive risks, roadmap, and plan
//! synchronously and assemble the report. Rule lookups always complete
//! before any fusion runs. External calls carry their own timeout and a
//! single retry; failures degrade the report instead of failing it, and
//! the outer deadline only cuts the non-critical subsidy lookup.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use exportready_core::category::derive_category;
use exportready_core::country::display_name;
use exportready_core::types::{
    Degradation, DegradedComponent, ExportReadinessReport, QueryInput, ReportMeta,
};
use exportready_rag::{ChunkFilters, RetrievedEvidence, Retriever};
use exportready_rules::RuleEngine;

use crate::assemble::{ReportParts, assemble_report};
use crate::backend::GenerativeBackend;
use crate::certifications::CertificationResolver;
use crate::config::PipelineConfig;
use crate::error::EngineError;
use crate::hs::HsPredictor;
use crate::plan::build_action_plan;
use crate::risk::RiskAnalyzer;
use crate::roadmap::build_roadmap;

/// The report engine: rules, retrieval, and a generative backend wired
/// into one pipeline. Stateless across requests; one instance serves
/// concurrent queries.
pub struct ReportEngine {
    rules: RuleEngine,
    retriever: Arc<Retriever>,
    backend: Arc<dyn GenerativeBackend>,
    config: PipelineConfig,
}

impl ReportEngine {
    pub fn new(
        rules: RuleEngine,
        retriever: Arc<Retriever>,
        backend: Arc<dyn GenerativeBackend>,
    ) -> ReportEngine {
        ReportEngine::with_config(rules, retriever, backend, PipelineConfig::default())
    }

    pub fn with_config(
        rules: RuleEngine,
        retriever: Arc<Retriever>,
        backend: Arc<dyn GenerativeBackend>,
        config: PipelineConfig,
    ) -> ReportEngine {
        ReportEngine {
            rules,
            retriever,
            backend,
            config,
        }
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate one export-readiness report.
    ///
    /// Errors only on invalid input or an inconsistency the assembler
    /// cannot correct; every external failure degrades the report and is
    /// recorded in its `degradations`.
    pub async fn generate(&self, query: &QueryInput) -> Result<ExportReadinessReport, EngineError> {
        let query = query.validated()?;
        let started = Instant::now();
        let mut degradations: Vec<Degradation> = Vec::new();

        let description = query.description_text();
        let category = derive_category(&description);
        let destination = display_name(&query.destination_country);

        let hs_query = format!("HS code classification for {description}");
        let cert_query = format!(
            "certifications and regulatory requirements for exporting {description} to {destination}"
        );
        let filters = ChunkFilters::for_country(&query.destination_country);

        let (hs_retrieval, cert_retrieval) = tokio::join!(
            self.retrieve_with_retry(&hs_query, &filters),
            self.retrieve_with_retry(&cert_query, &filters),
        );
        let (hs_evidence, cert_evidence) = match (hs_retrieval, cert_retrieval) {
            (Ok(hs), Ok(cert)) => (hs, cert),
            (hs, cert) => {
                let reason = [&hs, &cert]
                    .iter()
                    .find_map(|r| r.as_ref().err().cloned())
                    .unwrap_or_else(|| "retrieval failed".to_string());
                degradations.push(Degradation {
                    component: DegradedComponent::Retrieval,
                    reason,
                });
                (hs.unwrap_or_default(), cert.unwrap_or_default())
            }
        };

        // Rule lookups are local and must land before either model stage.
        let hs_hint = self.rules.hs_hint(category);
        let cert_hints = self.rules.match_certifications(
            category,
            &query.destination_country,
            query.business_type,
        );

        let predictor = HsPredictor::new(&self.config);
        let resolver = CertificationResolver::new(&self.config);
        let (hs_outcome, cert_outcome) = tokio::join!(
            predictor.predict(
                self.backend.as_ref(),
                &query,
                category,
                hs_hint.as_ref(),
                &hs_evidence,
            ),
            resolver.resolve(
                self.backend.as_ref(),
                &self.rules,
                &query,
                category,
                &cert_hints,
                &cert_evidence,
            ),
        );
        degradations.extend(hs_outcome.degradation);
        degradations.extend(cert_outcome.degradation);

        let certifications = cert_outcome.certifications;
        let risks =
            RiskAnalyzer::new(self.config.risk.clone()).analyze(&self.rules, &query, &certifications);
        let roadmap = build_roadmap(&query, &certifications, &risks)?;
        let action_plan = build_action_plan(&roadmap);

        let subsidies = if started.elapsed() >= self.config.deadline {
            degradations.push(Degradation {
                component: DegradedComponent::Subsidies,
                reason: format!(
                    "deadline of {} ms exceeded before subsidy lookup",
                    self.config.deadline.as_millis()
                ),
            });
            Vec::new()
        } else {
            self.rules.subsidies(
                query.business_type,
                query.company_size,
                &query.destination_country,
            )
        };

        let evidence = hs_evidence
            .iter()
            .chain(cert_evidence.iter())
            .map(RetrievedEvidence::to_evidence)
            .collect();

        let meta = ReportMeta {
            generated_at: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            rule_table_version: self.rules.table_version().to_string(),
            embedding_model: Some(self.retriever.provider().model_name().to_string()),
            generative_model: Some(self.backend.model_id().to_string()),
        };

        let report = assemble_report(ReportParts {
            query,
            hs: hs_outcome.prediction,
            certifications,
            risks,
            roadmap,
            action_plan,
            subsidies,
            evidence,
            degradations,
            meta,
        })?;
        Ok(report)
    }

    async fn retrieve_with_retry(
        &self,
        query_text: &str,
        filters: &ChunkFilters,
    ) -> Result<Vec<RetrievedEvidence>, String> {
        match self.retrieve_once(query_text, filters).await {
            Ok(evidence) => Ok(evidence),
            Err(_) => {
                tokio::time::sleep(self.config.retry_backoff).await;
                self.retrieve_once(query_text, filters).await
            }
        }
    }

    async fn retrieve_once(
        &self,
        query_text: &str,
        filters: &ChunkFilters,
    ) -> Result<Vec<RetrievedEvidence>, String> {
        match tokio::time::timeout(
            self.config.retrieval_timeout,
            self.retriever.retrieve(query_text, filters),
        )
        .await
        {
            Ok(Ok(evidence)) => Ok(evidence),
            Ok(Err(error)) => Err(error.to_string()),
            Err(_) => Err(format!(
                "retrieval timed out after {} ms",
                self.config.retrieval_timeout.as_millis()
            )),
        }
    }
}
