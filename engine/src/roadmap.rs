//! Compliance roadmap construction.
//!
//! Steps form a small dependency graph: registrations unlock filings and
//! certifications, and the first-shipment step waits on everything legally
//! required. Ordering is a topological sort that always emits the
//! shortest ready step first, so quick independent wins surface before
//! long-running applications.

use std::collections::{HashMap, HashSet};

use exportready_core::types::{
    Certification, QueryInput, ReportIntegrityError, Risk, RoadmapStep, Severity, StepKind,
};

const IEC_DAYS: u32 = 7;
const GST_LUT_DAYS: u32 = 3;
const STPI_DAYS: u32 = 10;
const MITIGATION_DAYS: u32 = 5;
const LOGISTICS_DAYS: u32 = 3;

const IEC_KEY: &str = "iec";
const GST_LUT_KEY: &str = "gst-lut";
const STPI_KEY: &str = "stpi";
const LOGISTICS_KEY: &str = "logistics";

/// A step before numbering, keyed by a stable string so dependencies can
/// be declared before the final order is known.
#[derive(Debug, Clone)]
struct PlannedStep {
    key: String,
    title: String,
    description: String,
    kind: StepKind,
    duration_days: u32,
    deps: Vec<String>,
}

/// Build the roadmap for one query from its resolved certifications and
/// risks.
pub fn build_roadmap(
    query: &QueryInput,
    certifications: &[Certification],
    risks: &[Risk],
) -> Result<Vec<RoadmapStep>, ReportIntegrityError> {
    let mut steps = Vec::new();

    steps.push(PlannedStep {
        key: IEC_KEY.to_string(),
        title: "Obtain Import Export Code (IEC)".to_string(),
        description: "Apply for the IEC on the DGFT portal; it is the base registration \
                      every other export filing refers to."
            .to_string(),
        kind: StepKind::Registration,
        duration_days: IEC_DAYS,
        deps: vec![],
    });

    let filing_key = if query.business_type.ships_goods() {
        steps.push(PlannedStep {
            key: GST_LUT_KEY.to_string(),
            title: "File GST Letter of Undertaking".to_string(),
            description: "File the LUT on the GST portal to ship without paying IGST upfront; \
                          renew it each financial year."
                .to_string(),
            kind: StepKind::Registration,
            duration_days: GST_LUT_DAYS,
            deps: vec![IEC_KEY.to_string()],
        });
        GST_LUT_KEY
    } else {
        steps.push(PlannedStep {
            key: STPI_KEY.to_string(),
            title: "Register with STPI".to_string(),
            description: "Register as a non-STP unit with the jurisdictional STPI centre so \
                          SOFTEX filings and inward remittances reconcile."
                .to_string(),
            kind: StepKind::Registration,
            duration_days: STPI_DAYS,
            deps: vec![IEC_KEY.to_string()],
        });
        STPI_KEY
    };

    for cert in certifications {
        steps.push(PlannedStep {
            key: format!("cert-{}", cert.id),
            title: format!("Obtain {}", cert.name),
            description: cert.rationale.clone(),
            kind: StepKind::Certification,
            duration_days: cert.estimated_timeline_days.max(1),
            deps: vec![IEC_KEY.to_string()],
        });
    }

    for (index, risk) in risks.iter().enumerate() {
        if risk.severity != Severity::High {
            continue;
        }
        // Certification-linked risks are already covered by their
        // certification step.
        if certifications.iter().any(|c| risk.title.contains(&c.name)) {
            continue;
        }
        steps.push(PlannedStep {
            key: format!("mitigate-{index}"),
            title: format!("Resolve: {}", risk.title),
            description: risk.mitigation.clone(),
            kind: StepKind::Mitigation,
            duration_days: MITIGATION_DAYS,
            deps: vec![],
        });
    }

    let mut logistics_deps = vec![filing_key.to_string()];
    logistics_deps.extend(
        certifications
            .iter()
            .filter(|c| c.mandatory)
            .map(|c| format!("cert-{}", c.id)),
    );
    steps.push(PlannedStep {
        key: LOGISTICS_KEY.to_string(),
        title: "Prepare first shipment".to_string(),
        description: "Register the AD code with customs, book freight, and assemble the \
                      final document set for the first consignment."
            .to_string(),
        kind: StepKind::Logistics,
        duration_days: LOGISTICS_DAYS,
        deps: logistics_deps,
    });

    order_steps(steps)
}

/// Kahn's ordering over the planned steps, emitting the shortest ready
/// step first; insertion order breaks duration ties. A cycle or a
/// dependency on an unknown key is an integrity error.
fn order_steps(steps: Vec<PlannedStep>) -> Result<Vec<RoadmapStep>, ReportIntegrityError> {
    let known: HashSet<&str> = steps.iter().map(|s| s.key.as_str()).collect();
    if steps
        .iter()
        .any(|s| s.deps.iter().any(|d| !known.contains(d.as_str())))
    {
        return Err(ReportIntegrityError::InvalidRoadmap);
    }

    let mut emitted: HashMap<String, u32> = HashMap::new();
    let mut ordered = Vec::with_capacity(steps.len());
    let mut done = vec![false; steps.len()];

    while ordered.len() < steps.len() {
        let mut next: Option<usize> = None;
        for (index, step) in steps.iter().enumerate() {
            if done[index] {
                continue;
            }
            if !step.deps.iter().all(|d| emitted.contains_key(d)) {
                continue;
            }
            match next {
                Some(best) if steps[best].duration_days <= step.duration_days => {}
                _ => next = Some(index),
            }
        }
        let Some(index) = next else {
            return Err(ReportIntegrityError::InvalidRoadmap);
        };

        done[index] = true;
        let step = &steps[index];
        let number = (ordered.len() + 1) as u32;
        emitted.insert(step.key.clone(), number);

        let mut depends_on: Vec<u32> = step.deps.iter().map(|d| emitted[d]).collect();
        depends_on.sort_unstable();
        ordered.push(RoadmapStep {
            number,
            title: step.title.clone(),
            description: step.description.clone(),
            kind: step.kind,
            duration_days: step.duration_days,
            depends_on,
        });
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exportready_core::types::{
        BusinessType, CertificationType, CompanySize, EstimateProvenance, MoneyRange, Priority,
        is_valid_roadmap,
    };

    fn query(business_type: BusinessType) -> QueryInput {
        QueryInput {
            product_name: "Test product".to_string(),
            ingredients: None,
            image_summary: None,
            destination_country: "US".to_string(),
            business_type,
            company_size: CompanySize::Micro,
            monthly_volume: None,
            price_range: None,
            payment_mode: None,
        }
    }

    fn cert(id: &str, name: &str, mandatory: bool, days: u32) -> Certification {
        Certification {
            id: id.to_string(),
            name: name.to_string(),
            certification_type: CertificationType::Fda,
            mandatory,
            priority: Priority::High,
            estimated_cost: MoneyRange::inr(10_000, 20_000),
            estimated_timeline_days: days,
            provenance: EstimateProvenance::Verified,
            rationale: "Required for the destination".to_string(),
            evidence_refs: vec![],
        }
    }

    #[test]
    fn goods_roadmap_is_valid_and_ends_with_logistics() {
        let certifications = vec![cert("us-fda-facility", "FDA Registration", true, 30)];
        let roadmap =
            build_roadmap(&query(BusinessType::Manufacturing), &certifications, &[]).unwrap();

        assert!(is_valid_roadmap(&roadmap));
        assert_eq!(roadmap[0].title, "Obtain Import Export Code (IEC)");
        let last = roadmap.last().unwrap();
        assert_eq!(last.kind, StepKind::Logistics);
        // The shipment step waits on the LUT and the mandatory
        // certification.
        assert_eq!(last.depends_on.len(), 2);
        assert!(roadmap.iter().any(|s| s.title.contains("GST Letter")));
    }

    #[test]
    fn saas_roadmap_uses_stpi_instead_of_lut() {
        let roadmap = build_roadmap(&query(BusinessType::SaaS), &[], &[]).unwrap();
        assert!(roadmap.iter().any(|s| s.title.contains("STPI")));
        assert!(!roadmap.iter().any(|s| s.title.contains("GST Letter")));
    }

    #[test]
    fn shorter_ready_step_comes_first() {
        let certifications = vec![
            cert("slow-cert", "Slow Certification", false, 60),
            cert("fast-cert", "Fast Certification", false, 10),
        ];
        let roadmap =
            build_roadmap(&query(BusinessType::Manufacturing), &certifications, &[]).unwrap();

        let fast = roadmap
            .iter()
            .position(|s| s.title.contains("Fast"))
            .unwrap();
        let slow = roadmap
            .iter()
            .position(|s| s.title.contains("Slow"))
            .unwrap();
        assert!(fast < slow);
    }

    #[test]
    fn substance_risk_gets_a_mitigation_step() {
        let risk = Risk::new(
            "Restricted substance: lead chromate",
            "description",
            Severity::High,
            "Obtain a lab report",
        );
        let roadmap = build_roadmap(&query(BusinessType::Manufacturing), &[], &[risk]).unwrap();
        assert!(
            roadmap
                .iter()
                .any(|s| s.kind == StepKind::Mitigation && s.title.contains("lead chromate"))
        );
    }

    #[test]
    fn certification_linked_risk_gets_no_extra_step() {
        let certifications = vec![cert("us-fda-facility", "FDA Registration", true, 30)];
        let risk = Risk::new(
            "FDA Registration not yet obtained",
            "description",
            Severity::High,
            "Apply now",
        );
        let roadmap =
            build_roadmap(&query(BusinessType::Manufacturing), &certifications, &[risk]).unwrap();
        assert!(!roadmap.iter().any(|s| s.kind == StepKind::Mitigation));
    }

    #[test]
    fn low_severity_risks_get_no_step() {
        let risk = Risk::new("Documentation accuracy", "d", Severity::Low, "m");
        let roadmap = build_roadmap(&query(BusinessType::Manufacturing), &[], &[risk]).unwrap();
        assert!(!roadmap.iter().any(|s| s.kind == StepKind::Mitigation));
    }

    #[test]
    fn unknown_dependency_is_an_integrity_error() {
        let steps = vec![PlannedStep {
            key: "a".to_string(),
            title: "A".to_string(),
            description: String::new(),
            kind: StepKind::Registration,
            duration_days: 1,
            deps: vec!["missing".to_string()],
        }];
        assert_eq!(
            order_steps(steps).unwrap_err(),
            ReportIntegrityError::InvalidRoadmap
        );
    }

    #[test]
    fn dependency_cycle_is_an_integrity_error() {
        let steps = vec![
            PlannedStep {
                key: "a".to_string(),
                title: "A".to_string(),
                description: String::new(),
                kind: StepKind::Registration,
                duration_days: 1,
                deps: vec!["b".to_string()],
            },
            PlannedStep {
                key: "b".to_string(),
                title: "B".to_string(),
                description: String::new(),
                kind: StepKind::Registration,
                duration_days: 1,
                deps: vec!["a".to_string()],
            },
        ];
        assert_eq!(
            order_steps(steps).unwrap_err(),
            ReportIntegrityError::InvalidRoadmap
        );
    }
}
