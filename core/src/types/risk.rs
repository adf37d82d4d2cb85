use serde::{Deserialize, Serialize};

/// Risk severity. Ordering matters: aggregation weights High above Medium
/// above Low.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Weight used by the aggregate risk score.
    pub fn weight(&self) -> f32 {
        match self {
            Severity::Low => 1.0,
            Severity::Medium => 2.0,
            Severity::High => 3.0,
        }
    }
}

/// One identified risk with its mitigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub mitigation: String,

    /// This risk's contribution to the aggregate score, normally
    /// `severity.weight()`. Kept on the item so the report can show how
    /// the aggregate was built.
    pub score_contribution: f32,
}

impl Risk {
    pub fn new(title: &str, description: &str, severity: Severity, mitigation: &str) -> Risk {
        Risk {
            title: title.to_string(),
            description: description.to_string(),
            severity,
            mitigation: mitigation.to_string(),
            score_contribution: severity.weight(),
        }
    }
}

/// Aggregate risk score over a set of risks, scaled to 0..=100.
///
/// Weighted mean rather than max: five Medium risks should read worse
/// than one, and one High risk should not saturate the scale on its own.
/// An empty set scores 0.
pub fn aggregate_risk_score(risks: &[Risk]) -> f32 {
    if risks.is_empty() {
        return 0.0;
    }
    let sum: f32 = risks.iter().map(|r| r.score_contribution).sum();
    let mean = sum / risks.len() as f32;
    let max_weight = Severity::High.weight();
    (mean / max_weight * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(severity: Severity) -> Risk {
        Risk::new("t", "d", severity, "m")
    }

    #[test]
    fn severity_weights() {
        assert_eq!(Severity::Low.weight(), 1.0);
        assert_eq!(Severity::Medium.weight(), 2.0);
        assert_eq!(Severity::High.weight(), 3.0);
    }

    #[test]
    fn empty_risks_score_zero() {
        assert_eq!(aggregate_risk_score(&[]), 0.0);
    }

    #[test]
    fn single_high_risk_scores_full() {
        let score = aggregate_risk_score(&[risk(Severity::High)]);
        assert!((score - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mixed_risks_average() {
        // (3 + 1) / 2 = 2.0 mean, over max 3.0 → 66.67
        let score = aggregate_risk_score(&[risk(Severity::High), risk(Severity::Low)]);
        assert!((score - 66.666_67).abs() < 0.01);
    }

    #[test]
    fn many_low_risks_stay_low_but_nonzero() {
        let risks: Vec<Risk> = (0..10).map(|_| risk(Severity::Low)).collect();
        let score = aggregate_risk_score(&risks);
        assert!((score - 33.333_33).abs() < 0.01);
    }

    #[test]
    fn score_is_bounded() {
        let mut inflated = risk(Severity::High);
        inflated.score_contribution = 50.0;
        let score = aggregate_risk_score(&[inflated]);
        assert_eq!(score, 100.0);
    }
}
