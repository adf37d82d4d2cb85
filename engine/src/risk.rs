//! Risk analysis over resolved certifications and rule-table lookups.
//!
//! Four sources, in order: unmet mandatory certifications, historically
//! rejection-prone certifications for the destination, restricted-substance
//! hits, and the baseline market-entry risks every exporter carries. The
//! analyzer is synchronous and deterministic; the aggregate score is
//! computed later by the assembler from the returned items.

use exportready_core::types::{Certification, PaymentMode, QueryInput, Risk, Severity};
use exportready_rules::RuleEngine;

use crate::config::RiskConfig;

/// Derives the risk list for one query.
#[derive(Debug, Clone)]
pub struct RiskAnalyzer {
    config: RiskConfig,
}

impl RiskAnalyzer {
    pub fn new(config: RiskConfig) -> RiskAnalyzer {
        RiskAnalyzer { config }
    }

    pub fn analyze(
        &self,
        rules: &RuleEngine,
        query: &QueryInput,
        certifications: &[Certification],
    ) -> Vec<Risk> {
        let mut risks = Vec::new();
        let country = &query.destination_country;

        for cert in certifications.iter().filter(|c| c.mandatory) {
            risks.push(Risk::new(
                &format!("{} not yet obtained", cert.name),
                &format!(
                    "{} is legally required for this shipment and approval is still pending. \
                     Shipping before it is granted risks seizure or rejection at the border.",
                    cert.name
                ),
                Severity::High,
                &format!(
                    "Start the {} application immediately; allow roughly {} days.",
                    cert.name, cert.estimated_timeline_days
                ),
            ));
        }

        for cert in certifications {
            let Some(rate) = rules.rejection_rate(&cert.id, country) else {
                continue;
            };
            let severity = if rate >= self.config.high_rejection_threshold {
                Severity::High
            } else if rate >= self.config.medium_rejection_threshold {
                Severity::Medium
            } else {
                continue;
            };
            risks.push(Risk::new(
                &format!("Elevated rejection history for {}", cert.name),
                &format!(
                    "{:.0}% of recent {} applications for this destination were rejected, \
                     usually over incomplete documentation or labeling gaps.",
                    rate * 100.0,
                    cert.name
                ),
                severity,
                "Have a customs broker or consultant pre-review the application and label artwork.",
            ));
        }

        for hit in rules.denylist_hits(country, &query.description_text()) {
            risks.push(Risk::new(
                &format!("Restricted substance: {}", hit.substance),
                &format!(
                    "The product description mentions {}, which is restricted for this \
                     destination. {}",
                    hit.substance, hit.note
                ),
                Severity::High,
                "Reformulate to remove the substance or obtain a laboratory report proving it is absent.",
            ));
        }

        risks.push(Risk::new(
            "Documentation accuracy",
            "Commercial invoice, packing list, and certificate details must match exactly; \
             small mismatches are the most common cause of customs holds.",
            Severity::Low,
            "Cross-check all shipping documents against the proforma invoice before handover.",
        ));

        let payment_exposed = matches!(query.payment_mode, None | Some(PaymentMode::OpenAccount));
        if payment_exposed {
            risks.push(Risk::new(
                "Payment realization",
                "No advance payment or letter of credit is in place, so the full invoice \
                 value is exposed until the buyer pays.",
                Severity::Medium,
                "Negotiate a part-advance or letter of credit, or insure the receivable through ECGC.",
            ));
        }

        risks
    }
}
