//! Rule-table definition and loading.
//!
//! The table is one versioned TOML artifact holding every deterministic
//! dataset the pipeline consults: certification rules, HS chapter hints,
//! verified cost/timeline entries, historical rejection rates, restricted
//! substance denylists, and the subsidy catalog. It is loaded once and
//! passed by reference into [`RuleEngine`](crate::engine::RuleEngine);
//! nothing in this crate reads it from a global.

use exportready_core::types::{CertificationType, Money, MoneyRange, Priority, Subsidy};
use serde::Deserialize;

use crate::error::RuleError;

/// The built-in table shipped with the crate.
const BUILTIN_TABLE: &str = include_str!("data/rules.toml");

/// One certification rule keyed by (categories, countries, business types).
/// `"*"` in any key position matches everything.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificationRule {
    pub id: String,
    pub name: String,
    pub certification_type: String,
    pub categories: Vec<String>,
    pub countries: Vec<String>,
    pub business_types: Vec<String>,
    pub mandatory: bool,
    pub priority: Priority,
    pub rationale: String,
}

impl CertificationRule {
    pub fn certification_type(&self) -> CertificationType {
        CertificationType::parse(&self.certification_type)
    }

    /// Specificity of a match: one point per non-wildcard axis that
    /// matched, `None` when any axis fails to match. Higher wins.
    pub fn specificity(&self, category: &str, country: &str, business_type: &str) -> Option<u8> {
        let mut score = 0;
        for (values, needle) in [
            (&self.categories, category),
            (&self.countries, country),
            (&self.business_types, business_type),
        ] {
            if values.iter().any(|v| v == "*") {
                continue;
            }
            if values.iter().any(|v| v.eq_ignore_ascii_case(needle)) {
                score += 1;
            } else {
                return None;
            }
        }
        Some(score)
    }
}

/// Classification hint for one product category.
#[derive(Debug, Clone, Deserialize)]
pub struct HsHintEntry {
    pub category: String,
    pub chapter: String,
    pub default_code: String,
    pub description: String,
}

/// Verified cost and timeline for a certification in given destinations.
#[derive(Debug, Clone, Deserialize)]
pub struct CostEntry {
    pub certification_id: String,
    pub countries: Vec<String>,
    pub min_cost: u64,
    pub max_cost: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub timeline_days: u32,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl CostEntry {
    pub fn cost_range(&self) -> MoneyRange {
        MoneyRange::new(
            Money::new(self.min_cost, &self.currency),
            Money::new(self.max_cost, &self.currency),
        )
    }
}

/// Historical rejection rate for a certification in given destinations.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectionRateEntry {
    pub certification_id: String,
    pub countries: Vec<String>,
    /// Fraction of applications or consignments rejected, in [0, 1].
    pub rate: f32,
    #[serde(default)]
    pub note: String,
}

/// A restricted substance for given destinations.
#[derive(Debug, Clone, Deserialize)]
pub struct DenylistEntry {
    pub countries: Vec<String>,
    pub substance: String,
    pub note: String,
}

/// A subsidy scheme with its eligibility keys.
#[derive(Debug, Clone, Deserialize)]
pub struct SubsidyEntry {
    pub id: String,
    pub name: String,
    pub authority: String,
    pub description: String,
    #[serde(default)]
    pub max_benefit: Option<u64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub eligibility: String,
    pub business_types: Vec<String>,
    pub company_sizes: Vec<String>,
    pub countries: Vec<String>,
}

impl SubsidyEntry {
    pub fn to_subsidy(&self) -> Subsidy {
        Subsidy {
            id: self.id.clone(),
            name: self.name.clone(),
            authority: self.authority.clone(),
            description: self.description.clone(),
            max_benefit: self.max_benefit.map(|amount| Money::new(amount, &self.currency)),
            eligibility: self.eligibility.clone(),
        }
    }
}

/// The whole versioned rule table.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleTable {
    pub version: String,

    #[serde(default)]
    pub certification_rules: Vec<CertificationRule>,

    #[serde(default)]
    pub hs_hints: Vec<HsHintEntry>,

    #[serde(default)]
    pub cost_entries: Vec<CostEntry>,

    #[serde(default)]
    pub rejection_rates: Vec<RejectionRateEntry>,

    #[serde(default)]
    pub denylist: Vec<DenylistEntry>,

    #[serde(default)]
    pub subsidies: Vec<SubsidyEntry>,
}

impl RuleTable {
    /// Parse a table from TOML and validate it. Tests pass synthetic
    /// tables through here; operators can load an override file the same
    /// way.
    pub fn from_toml_str(raw: &str) -> Result<RuleTable, RuleError> {
        let table: RuleTable = toml::from_str(raw)?;
        table.validate()?;
        Ok(table)
    }

    /// The table compiled into the crate. A parse failure here is a
    /// packaging defect, not a runtime condition.
    pub fn builtin() -> RuleTable {
        match RuleTable::from_toml_str(BUILTIN_TABLE) {
            Ok(table) => table,
            Err(err) => unreachable!("builtin rule table failed to load: {err}"),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn validate(&self) -> Result<(), RuleError> {
        if self.version.trim().is_empty() {
            return Err(RuleError::Invalid("version must not be empty".to_string()));
        }
        for rule in &self.certification_rules {
            if rule.id.trim().is_empty() {
                return Err(RuleError::Invalid(
                    "certification rule with empty id".to_string(),
                ));
            }
            if rule.categories.is_empty()
                || rule.countries.is_empty()
                || rule.business_types.is_empty()
            {
                return Err(RuleError::Invalid(format!(
                    "rule '{}' has an empty key axis",
                    rule.id
                )));
            }
        }
        for entry in &self.cost_entries {
            if entry.min_cost > entry.max_cost {
                return Err(RuleError::Invalid(format!(
                    "cost entry for '{}' has min > max",
                    entry.certification_id
                )));
            }
            if entry.timeline_days == 0 {
                return Err(RuleError::Invalid(format!(
                    "cost entry for '{}' has zero timeline",
                    entry.certification_id
                )));
            }
        }
        for entry in &self.rejection_rates {
            if !(0.0..=1.0).contains(&entry.rate) {
                return Err(RuleError::Invalid(format!(
                    "rejection rate for '{}' outside 0..=1",
                    entry.certification_id
                )));
            }
        }
        for entry in &self.denylist {
            if entry.substance.trim().is_empty() {
                return Err(RuleError::Invalid("denylist entry with empty substance".to_string()));
            }
        }
        Ok(())
    }
}
