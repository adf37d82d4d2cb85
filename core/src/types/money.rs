use serde::{Deserialize, Serialize};

/// A monetary amount in whole currency units.
///
/// Compliance costs are coarse estimates (nobody quotes paise for a BIS
/// license), so whole units with a currency code are enough.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Money {
    pub amount: u64,
    pub currency: String,
}

impl Money {
    pub fn inr(amount: u64) -> Money {
        Money {
            amount,
            currency: "INR".to_string(),
        }
    }

    pub fn new(amount: u64, currency: &str) -> Money {
        Money {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// An estimated cost band. `min <= max` is enforced at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoneyRange {
    pub min: Money,
    pub max: Money,
}

impl MoneyRange {
    /// Build a range, swapping the bounds if they arrive inverted. Model
    /// output occasionally produces min > max.
    pub fn new(min: Money, max: Money) -> MoneyRange {
        if min.amount <= max.amount {
            MoneyRange { min, max }
        } else {
            MoneyRange { min: max, max: min }
        }
    }

    pub fn inr(min: u64, max: u64) -> MoneyRange {
        MoneyRange::new(Money::inr(min), Money::inr(max))
    }

    pub fn zero(currency: &str) -> MoneyRange {
        MoneyRange {
            min: Money::new(0, currency),
            max: Money::new(0, currency),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.amount <= self.max.amount && self.min.currency == self.max.currency
    }

    pub fn midpoint(&self) -> u64 {
        (self.min.amount + self.max.amount) / 2
    }
}

/// One named component of the total cost estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostComponent {
    pub label: String,
    pub range: MoneyRange,
}

/// Cost estimate for the whole export-readiness effort.
///
/// The total is always recomputed from the components at assembly; it is
/// never accepted from a sub-stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub components: Vec<CostComponent>,
    pub total: MoneyRange,
}

impl CostBreakdown {
    /// Sum components into a fresh breakdown. All components are assumed to
    /// share a currency; mixed currencies are the caller's error and are
    /// surfaced by `is_consistent`.
    pub fn from_components(components: Vec<CostComponent>) -> CostBreakdown {
        let currency = components
            .first()
            .map(|c| c.range.min.currency.clone())
            .unwrap_or_else(|| "INR".to_string());

        let min = components.iter().map(|c| c.range.min.amount).sum();
        let max = components.iter().map(|c| c.range.max.amount).sum();

        CostBreakdown {
            components,
            total: MoneyRange::new(Money::new(min, &currency), Money::new(max, &currency)),
        }
    }

    /// True when the stored total matches the component sums exactly.
    pub fn is_consistent(&self) -> bool {
        let min: u64 = self.components.iter().map(|c| c.range.min.amount).sum();
        let max: u64 = self.components.iter().map(|c| c.range.max.amount).sum();
        self.total.is_valid() && self.total.min.amount == min && self.total.max.amount == max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_swaps_inverted_bounds() {
        let range = MoneyRange::new(Money::inr(500), Money::inr(100));
        assert_eq!(range.min.amount, 100);
        assert_eq!(range.max.amount, 500);
        assert!(range.is_valid());
    }

    #[test]
    fn breakdown_total_is_component_sum() {
        let breakdown = CostBreakdown::from_components(vec![
            CostComponent {
                label: "FDA registration".to_string(),
                range: MoneyRange::inr(20_000, 40_000),
            },
            CostComponent {
                label: "Testing and documentation".to_string(),
                range: MoneyRange::inr(5_000, 15_000),
            },
        ]);
        assert_eq!(breakdown.total.min.amount, 25_000);
        assert_eq!(breakdown.total.max.amount, 55_000);
        assert!(breakdown.is_consistent());
    }

    #[test]
    fn empty_breakdown_is_zero_and_consistent() {
        let breakdown = CostBreakdown::from_components(Vec::new());
        assert_eq!(breakdown.total.min.amount, 0);
        assert_eq!(breakdown.total.max.amount, 0);
        assert!(breakdown.is_consistent());
    }

    #[test]
    fn tampered_total_is_inconsistent() {
        let mut breakdown = CostBreakdown::from_components(vec![CostComponent {
            label: "x".to_string(),
            range: MoneyRange::inr(10, 20),
        }]);
        breakdown.total.max.amount = 999;
        assert!(!breakdown.is_consistent());
    }

    #[test]
    fn midpoint() {
        assert_eq!(MoneyRange::inr(10, 20).midpoint(), 15);
    }
}
