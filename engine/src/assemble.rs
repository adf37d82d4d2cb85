//! Final report assembly.
//!
//! Pure composition: no I/O and no inference. Derived values (cost total,
//! timeline total, aggregate risk score) are recomputed here from the
//! parts rather than trusted from the stages, and the finished report is
//! validated before release.

use std::collections::HashMap;

use exportready_core::types::{
    ActionPlan, Certification, CostBreakdown, CostComponent, Degradation, Evidence,
    ExportReadinessReport, HsCodePrediction, QueryInput, ReportIntegrityError, ReportMeta, Risk,
    RoadmapStep, StepKind, Subsidy, Timeline, TimelinePhase, aggregate_risk_score,
};

/// Everything the stages produced for one query, ready to be composed.
pub struct ReportParts {
    pub query: QueryInput,
    pub hs: HsCodePrediction,
    pub certifications: Vec<Certification>,
    pub risks: Vec<Risk>,
    pub roadmap: Vec<RoadmapStep>,
    pub action_plan: ActionPlan,
    pub subsidies: Vec<Subsidy>,
    pub evidence: Vec<Evidence>,
    pub degradations: Vec<Degradation>,
    pub meta: ReportMeta,
}

/// Compose and validate the final report.
pub fn assemble_report(parts: ReportParts) -> Result<ExportReadinessReport, ReportIntegrityError> {
    let ReportParts {
        query,
        mut hs,
        mut certifications,
        risks,
        roadmap,
        action_plan,
        subsidies,
        evidence,
        degradations,
        meta,
    } = parts;

    certifications.sort_by(|a, b| {
        b.mandatory
            .cmp(&a.mandatory)
            .then(b.priority.cmp(&a.priority))
            .then(a.name.cmp(&b.name))
    });

    hs.confidence = hs.confidence.clamp(0.0, 1.0);
    for alternative in &mut hs.alternatives {
        alternative.confidence = alternative.confidence.clamp(0.0, 1.0);
    }

    let costs = CostBreakdown::from_components(
        certifications
            .iter()
            .map(|c| CostComponent {
                label: c.name.clone(),
                range: c.estimated_cost.clone(),
            })
            .collect(),
    );

    let manual_review_recommended = hs.needs_manual_review || !degradations.is_empty();

    let report = ExportReadinessReport {
        product_name: query.product_name.clone(),
        destination_country: query.destination_country.clone(),
        hs_code: hs,
        risk_score: aggregate_risk_score(&risks),
        risks,
        certifications,
        timeline: timeline_from_roadmap(&roadmap),
        costs,
        roadmap,
        action_plan,
        subsidies,
        evidence: dedupe_evidence(evidence),
        degradations,
        manual_review_recommended,
        meta,
    };

    report.validate()?;
    Ok(report)
}

/// Phase breakdown by step kind, in journey order. The total is the sum
/// of every step, so the phases always account for it exactly.
fn timeline_from_roadmap(roadmap: &[RoadmapStep]) -> Timeline {
    let order = [
        (StepKind::Registration, "Registration"),
        (StepKind::Certification, "Certification"),
        (StepKind::Mitigation, "Risk mitigation"),
        (StepKind::Logistics, "Logistics"),
    ];
    let phases: Vec<TimelinePhase> = order
        .iter()
        .filter_map(|(kind, name)| {
            let days: u32 = roadmap
                .iter()
                .filter(|s| s.kind == *kind)
                .map(|s| s.duration_days)
                .sum();
            (days > 0).then(|| TimelinePhase {
                name: name.to_string(),
                duration_days: days,
            })
        })
        .collect();

    Timeline {
        total_days: roadmap.iter().map(|s| s.duration_days).sum(),
        phases,
    }
}

/// Collapse evidence cited by several stages to one entry per chunk,
/// keeping the best rank, ordered best-first.
fn dedupe_evidence(evidence: Vec<Evidence>) -> Vec<Evidence> {
    let mut best: HashMap<String, Evidence> = HashMap::new();
    for item in evidence {
        match best.get(&item.chunk_id) {
            Some(existing) if existing.rank <= item.rank => {}
            _ => {
                best.insert(item.chunk_id.clone(), item);
            }
        }
    }
    let mut deduped: Vec<Evidence> = best.into_values().collect();
    deduped.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.chunk_id.cmp(&b.chunk_id)));
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use exportready_core::types::{
        BusinessType, CertificationType, CompanySize, EstimateProvenance, MoneyRange, Priority,
        Severity,
    };

    fn meta() -> ReportMeta {
        ReportMeta {
            generated_at: Utc::now(),
            engine_version: "test".to_string(),
            rule_table_version: "test".to_string(),
            embedding_model: None,
            generative_model: None,
        }
    }

    fn query() -> QueryInput {
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

    fn hs() -> HsCodePrediction {
        HsCodePrediction {
            code: "0910.30".to_string(),
            confidence: 0.85,
            description: "Turmeric".to_string(),
            alternatives: vec![],
            evidence_refs: vec![],
            needs_manual_review: false,
        }
    }

    fn cert(name: &str, mandatory: bool, priority: Priority, cost: (u64, u64)) -> Certification {
        Certification {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            certification_type: CertificationType::Fda,
            mandatory,
            priority,
            estimated_cost: MoneyRange::inr(cost.0, cost.1),
            estimated_timeline_days: 30,
            provenance: EstimateProvenance::Verified,
            rationale: "test".to_string(),
            evidence_refs: vec![],
        }
    }

    fn evidence(chunk_id: &str, rank: usize) -> Evidence {
        Evidence {
            chunk_id: chunk_id.to_string(),
            source: "source".to_string(),
            snippet: "snippet".to_string(),
            country: None,
            certification_type: None,
            similarity: 0.8,
            rank,
        }
    }

    fn roadmap() -> Vec<RoadmapStep> {
        vec![
            RoadmapStep {
                number: 1,
                title: "Obtain IEC".to_string(),
                description: String::new(),
                kind: StepKind::Registration,
                duration_days: 7,
                depends_on: vec![],
            },
            RoadmapStep {
                number: 2,
                title: "Obtain FDA Registration".to_string(),
                description: String::new(),
                kind: StepKind::Certification,
                duration_days: 30,
                depends_on: vec![1],
            },
            RoadmapStep {
                number: 3,
                title: "Prepare first shipment".to_string(),
                description: String::new(),
                kind: StepKind::Logistics,
                duration_days: 3,
                depends_on: vec![1, 2],
            },
        ]
    }

    fn parts() -> ReportParts {
        ReportParts {
            query: query(),
            hs: hs(),
            certifications: vec![],
            risks: vec![],
            roadmap: roadmap(),
            action_plan: ActionPlan::empty(),
            subsidies: vec![],
            evidence: vec![],
            degradations: vec![],
            meta: meta(),
        }
    }

    #[test]
    fn certifications_order_mandatory_then_priority_then_name() {
        let mut p = parts();
        p.certifications = vec![
            cert("B Optional High", false, Priority::High, (0, 10)),
            cert("A Mandatory Low", true, Priority::Low, (0, 10)),
            cert("C Mandatory High", true, Priority::High, (0, 10)),
            cert("A Optional High", false, Priority::High, (0, 10)),
        ];
        let report = assemble_report(p).unwrap();
        let names: Vec<&str> = report.certifications.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "C Mandatory High",
                "A Mandatory Low",
                "A Optional High",
                "B Optional High"
            ]
        );
    }

    #[test]
    fn cost_total_is_recomputed_from_certifications() {
        let mut p = parts();
        p.certifications = vec![
            cert("FDA Registration", true, Priority::High, (15_000, 40_000)),
            cert("Testing", false, Priority::Low, (5_000, 10_000)),
        ];
        let report = assemble_report(p).unwrap();
        assert_eq!(report.costs.total.min.amount, 20_000);
        assert_eq!(report.costs.total.max.amount, 50_000);
        assert!(report.costs.is_consistent());
    }

    #[test]
    fn timeline_phases_sum_to_total() {
        let report = assemble_report(parts()).unwrap();
        assert_eq!(report.timeline.total_days, 40);
        let phase_sum: u32 = report.timeline.phases.iter().map(|p| p.duration_days).sum();
        assert_eq!(phase_sum, 40);
        assert!(report.timeline.is_consistent());
        assert_eq!(report.timeline.phases[0].name, "Registration");
    }

    #[test]
    fn evidence_is_deduped_keeping_best_rank() {
        let mut p = parts();
        p.evidence = vec![
            evidence("chunk-a", 3),
            evidence("chunk-b", 1),
            evidence("chunk-a", 1),
        ];
        let report = assemble_report(p).unwrap();
        assert_eq!(report.evidence.len(), 2);
        assert!(report.evidence.iter().all(|e| e.rank == 1));
    }

    #[test]
    fn risk_score_is_recomputed() {
        let mut p = parts();
        p.risks = vec![
            Risk::new("a", "d", Severity::High, "m"),
            Risk::new("b", "d", Severity::Low, "m"),
        ];
        let report = assemble_report(p).unwrap();
        assert!((report.risk_score - 66.666_67).abs() < 0.01);
    }

    #[test]
    fn degradations_force_manual_review() {
        use exportready_core::types::DegradedComponent;
        let mut p = parts();
        p.degradations = vec![Degradation {
            component: DegradedComponent::Retrieval,
            reason: "index unreachable".to_string(),
        }];
        let report = assemble_report(p).unwrap();
        assert!(report.manual_review_recommended);
        assert!(report.is_degraded());
    }

    #[test]
    fn out_of_range_inputs_are_clamped_not_rejected() {
        let mut p = parts();
        p.hs.confidence = 1.7;
        let report = assemble_report(p).unwrap();
        assert_eq!(report.hs_code.confidence, 1.0);
    }

    #[test]
    fn invalid_certification_fails_assembly() {
        let mut p = parts();
        let mut bad = cert("Broken", true, Priority::High, (0, 10));
        bad.estimated_timeline_days = 0;
        p.certifications = vec![bad];
        assert!(matches!(
            assemble_report(p).unwrap_err(),
            ReportIntegrityError::InvalidCertification(_)
        ));
    }
}
