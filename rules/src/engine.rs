//! Deterministic certification matching over a loaded rule table.

use std::sync::Arc;

use exportready_core::category::ProductCategory;
use exportready_core::types::{BusinessType, CompanySize, Subsidy};

use crate::table::RuleTable;
use crate::types::{CertificationHint, CostTimeline, DenylistHit, HsChapterHint};

/// Read-only view over one rule table version.
///
/// Construction takes the table explicitly so tests can run against
/// synthetic tables; request handling never mutates it, so one engine is
/// shared across concurrent queries.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    table: Arc<RuleTable>,
}

impl RuleEngine {
    pub fn new(table: Arc<RuleTable>) -> RuleEngine {
        RuleEngine { table }
    }

    /// Engine over the table compiled into the crate.
    pub fn with_builtin_table() -> RuleEngine {
        RuleEngine::new(Arc::new(RuleTable::builtin()))
    }

    pub fn table_version(&self) -> &str {
        self.table.version()
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// All certification hints for a (category, destination, business type)
    /// key. Most-specific rules win: when two rules propose the same
    /// certification, the one matching more exact axes decides mandatory
    /// and priority. No match is an empty list, never an error.
    pub fn match_certifications(
        &self,
        category: ProductCategory,
        country: &str,
        business_type: BusinessType,
    ) -> Vec<CertificationHint> {
        let mut matched: Vec<(u8, usize)> = Vec::new();
        for (index, rule) in self.table.certification_rules.iter().enumerate() {
            if let Some(specificity) =
                rule.specificity(category.as_str(), country, business_type.as_str())
            {
                matched.push((specificity, index));
            }
        }

        // Sort by specificity descending; table order breaks ties.
        matched.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut hints: Vec<CertificationHint> = Vec::new();
        for (_, index) in matched {
            let rule = &self.table.certification_rules[index];
            if hints.iter().any(|h| h.certification_id == rule.id) {
                continue;
            }
            hints.push(CertificationHint::new(
                &rule.id,
                &rule.name,
                rule.certification_type(),
                rule.mandatory,
                rule.priority,
                &rule.rationale,
            ));
        }
        hints
    }

    /// Pre-mapped HS chapter for a category, when the table has one.
    pub fn hs_hint(&self, category: ProductCategory) -> Option<HsChapterHint> {
        self.table
            .hs_hints
            .iter()
            .find(|entry| entry.category.eq_ignore_ascii_case(category.as_str()))
            .map(|entry| HsChapterHint {
                chapter: entry.chapter.clone(),
                default_code: entry.default_code.clone(),
                description: entry.description.clone(),
            })
    }

    /// Verified cost and timeline for a certification in a destination.
    /// An exact country entry beats a wildcard entry.
    pub fn cost_timeline(&self, certification_id: &str, country: &str) -> Option<CostTimeline> {
        let mut wildcard: Option<CostTimeline> = None;
        for entry in &self.table.cost_entries {
            if entry.certification_id != certification_id {
                continue;
            }
            if entry.countries.iter().any(|c| c.eq_ignore_ascii_case(country)) {
                return Some(CostTimeline {
                    cost: entry.cost_range(),
                    timeline_days: entry.timeline_days,
                });
            }
            if wildcard.is_none() && entry.countries.iter().any(|c| c == "*") {
                wildcard = Some(CostTimeline {
                    cost: entry.cost_range(),
                    timeline_days: entry.timeline_days,
                });
            }
        }
        wildcard
    }

    /// Historical rejection rate for a certification in a destination.
    pub fn rejection_rate(&self, certification_id: &str, country: &str) -> Option<f32> {
        self.table
            .rejection_rates
            .iter()
            .find(|entry| {
                entry.certification_id == certification_id
                    && entry
                        .countries
                        .iter()
                        .any(|c| c == "*" || c.eq_ignore_ascii_case(country))
            })
            .map(|entry| entry.rate)
    }

    /// Restricted substances for the destination found in the product
    /// text. Matching is case-insensitive substring over the full
    /// description.
    pub fn denylist_hits(&self, country: &str, text: &str) -> Vec<DenylistHit> {
        let haystack = text.to_lowercase();
        self.table
            .denylist
            .iter()
            .filter(|entry| {
                entry
                    .countries
                    .iter()
                    .any(|c| c == "*" || c.eq_ignore_ascii_case(country))
            })
            .filter(|entry| haystack.contains(&entry.substance.to_lowercase()))
            .map(|entry| DenylistHit {
                substance: entry.substance.clone(),
                note: entry.note.clone(),
            })
            .collect()
    }

    /// Subsidy schemes the exporter profile is eligible for.
    pub fn subsidies(
        &self,
        business_type: BusinessType,
        company_size: CompanySize,
        country: &str,
    ) -> Vec<Subsidy> {
        self.table
            .subsidies
            .iter()
            .filter(|entry| {
                list_matches(&entry.business_types, business_type.as_str())
                    && list_matches(&entry.company_sizes, company_size.as_str())
                    && list_matches(&entry.countries, country)
            })
            .map(|entry| entry.to_subsidy())
            .collect()
    }
}

fn list_matches(values: &[String], needle: &str) -> bool {
    values.iter().any(|v| v == "*" || v.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exportready_core::types::{CertificationType, Priority};

    fn synthetic_engine() -> RuleEngine {
        let table = RuleTable::from_toml_str(
            r#"
            version = "test.1"

            [[certification_rules]]
            id = "generic-quality"
            name = "Generic Quality Scheme"
            certification_type = "zed"
            categories = ["*"]
            countries = ["*"]
            business_types = ["*"]
            mandatory = false
            priority = "low"
            rationale = "baseline quality scheme"

            [[certification_rules]]
            id = "specific-ce"
            name = "CE Marking"
            certification_type = "ce"
            categories = ["electronics"]
            countries = ["DE"]
            business_types = ["manufacturing"]
            mandatory = true
            priority = "high"
            rationale = "EU conformity requirement"

            [[certification_rules]]
            id = "generic-quality"
            name = "Generic Quality Scheme (mandatory override)"
            certification_type = "zed"
            categories = ["electronics"]
            countries = ["DE"]
            business_types = ["*"]
            mandatory = true
            priority = "medium"
            rationale = "destination-specific override"

            [[cost_entries]]
            certification_id = "specific-ce"
            countries = ["DE"]
            min_cost = 50000
            max_cost = 200000
            timeline_days = 60

            [[cost_entries]]
            certification_id = "specific-ce"
            countries = ["*"]
            min_cost = 10000
            max_cost = 20000
            timeline_days = 30

            [[rejection_rates]]
            certification_id = "specific-ce"
            countries = ["DE"]
            rate = 0.07

            [[denylist]]
            countries = ["DE"]
            substance = "cadmium"
            note = "Restricted under EU RoHS"

            [[subsidies]]
            id = "msme-grant"
            name = "MSME Export Grant"
            authority = "Ministry of MSME"
            description = "Grant for first-time exporters"
            eligibility = "Micro and small registered businesses"
            business_types = ["manufacturing", "handicraft"]
            company_sizes = ["micro", "small"]
            countries = ["*"]
            "#,
        )
        .unwrap();
        RuleEngine::new(Arc::new(table))
    }

    // ==================== Certification matching ====================

    #[test]
    fn wildcard_rule_matches_everything() {
        let engine = synthetic_engine();
        let hints = engine.match_certifications(
            ProductCategory::Food,
            "US",
            BusinessType::Trading,
        );
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].certification_id, "generic-quality");
        assert!(!hints[0].mandatory);
    }

    #[test]
    fn specific_rule_overrides_wildcard_for_same_certification() {
        let engine = synthetic_engine();
        let hints = engine.match_certifications(
            ProductCategory::Electronics,
            "DE",
            BusinessType::Manufacturing,
        );

        let quality = hints
            .iter()
            .find(|h| h.certification_id == "generic-quality")
            .unwrap();
        assert!(quality.mandatory, "specific override must win");
        assert_eq!(quality.priority, Priority::Medium);

        let ce = hints.iter().find(|h| h.certification_id == "specific-ce").unwrap();
        assert!(ce.mandatory);
        assert_eq!(ce.certification_type, CertificationType::Ce);
    }

    #[test]
    fn hint_confidence_is_pinned_to_one() {
        let engine = synthetic_engine();
        let hints = engine.match_certifications(
            ProductCategory::Electronics,
            "DE",
            BusinessType::Manufacturing,
        );
        assert!(hints.iter().all(|h| h.confidence == 1.0));
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let table = RuleTable::from_toml_str("version = \"empty.1\"").unwrap();
        let engine = RuleEngine::new(Arc::new(table));
        let hints = engine.match_certifications(
            ProductCategory::Food,
            "US",
            BusinessType::Manufacturing,
        );
        assert!(hints.is_empty());
    }

    // ==================== Lookups ====================

    #[test]
    fn exact_country_cost_entry_beats_wildcard() {
        let engine = synthetic_engine();
        let exact = engine.cost_timeline("specific-ce", "DE").unwrap();
        assert_eq!(exact.cost.min.amount, 50_000);
        assert_eq!(exact.timeline_days, 60);

        let fallback = engine.cost_timeline("specific-ce", "FR").unwrap();
        assert_eq!(fallback.cost.min.amount, 10_000);
        assert_eq!(fallback.timeline_days, 30);
    }

    #[test]
    fn missing_cost_entry_is_none() {
        let engine = synthetic_engine();
        assert!(engine.cost_timeline("unknown-cert", "DE").is_none());
    }

    #[test]
    fn rejection_rate_lookup() {
        let engine = synthetic_engine();
        assert_eq!(engine.rejection_rate("specific-ce", "DE"), Some(0.07));
        assert_eq!(engine.rejection_rate("specific-ce", "US"), None);
    }

    #[test]
    fn denylist_matches_case_insensitively() {
        let engine = synthetic_engine();
        let hits = engine.denylist_hits("DE", "Toy coated with Cadmium pigment");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].substance, "cadmium");

        assert!(engine.denylist_hits("US", "cadmium pigment").is_empty());
        assert!(engine.denylist_hits("DE", "clean product").is_empty());
    }

    #[test]
    fn subsidies_filter_on_profile() {
        let engine = synthetic_engine();
        let eligible = engine.subsidies(BusinessType::Manufacturing, CompanySize::Micro, "US");
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, "msme-grant");

        let too_big = engine.subsidies(BusinessType::Manufacturing, CompanySize::Large, "US");
        assert!(too_big.is_empty());

        let wrong_type = engine.subsidies(BusinessType::SaaS, CompanySize::Micro, "US");
        assert!(wrong_type.is_empty());
    }

    // ==================== Builtin table scenarios ====================

    #[test]
    fn builtin_food_to_us_requires_fda() {
        let engine = RuleEngine::with_builtin_table();
        let hints = engine.match_certifications(
            ProductCategory::Food,
            "US",
            BusinessType::Manufacturing,
        );
        let fda = hints
            .iter()
            .find(|h| h.certification_type == CertificationType::Fda)
            .expect("FDA hint for food to US");
        assert!(fda.mandatory);
        assert_eq!(fda.priority, Priority::High);
    }

    #[test]
    fn builtin_electronics_to_germany_requires_ce_not_bis() {
        let engine = RuleEngine::with_builtin_table();
        let hints = engine.match_certifications(
            ProductCategory::Electronics,
            "DE",
            BusinessType::Manufacturing,
        );
        let ce = hints
            .iter()
            .find(|h| h.certification_type == CertificationType::Ce)
            .expect("CE hint for electronics to Germany");
        assert!(ce.mandatory);

        let bis = hints
            .iter()
            .find(|h| h.certification_type == CertificationType::Bis)
            .expect("BIS hint should still be surfaced");
        assert!(!bis.mandatory, "BIS is not mandatory for EU destinations");
    }

    #[test]
    fn builtin_saas_to_uk_requires_softex_and_no_goods_schemes() {
        let engine = RuleEngine::with_builtin_table();
        let hints =
            engine.match_certifications(ProductCategory::Software, "GB", BusinessType::SaaS);
        let softex = hints
            .iter()
            .find(|h| h.certification_type == CertificationType::Softex)
            .expect("SOFTEX hint for SaaS exports");
        assert!(softex.mandatory);

        assert!(
            hints
                .iter()
                .all(|h| !h.certification_type.is_physical_goods_scheme()),
            "software exports must not pick up physical-goods schemes"
        );
    }

    #[test]
    fn builtin_hs_hints_cover_scenario_categories() {
        let engine = RuleEngine::with_builtin_table();
        assert_eq!(engine.hs_hint(ProductCategory::Food).unwrap().chapter, "09");
        assert_eq!(engine.hs_hint(ProductCategory::Electronics).unwrap().chapter, "85");
        assert_eq!(engine.hs_hint(ProductCategory::Software).unwrap().chapter, "99");
    }

    #[test]
    fn builtin_zed_subsidy_for_micro_manufacturers() {
        let engine = RuleEngine::with_builtin_table();
        let subsidies =
            engine.subsidies(BusinessType::Manufacturing, CompanySize::Micro, "US");
        assert!(subsidies.iter().any(|s| s.id == "zed-subsidy"));
    }
}
