use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::certification::Certification;
use crate::types::evidence::Evidence;
use crate::types::hs::HsCodePrediction;
use crate::types::money::CostBreakdown;
use crate::types::plan::{ACTION_PLAN_DAYS, ActionPlan};
use crate::types::risk::Risk;
use crate::types::roadmap::{RoadmapStep, is_valid_roadmap};
use crate::types::subsidy::Subsidy;

/// One phase of the overall timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePhase {
    pub name: String,
    pub duration_days: u32,
}

/// Overall duration estimate with a phase breakdown. Phase durations sum
/// to at most the total; phases can overlap, so the sum may be smaller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub total_days: u32,
    pub phases: Vec<TimelinePhase>,
}

impl Timeline {
    pub fn is_consistent(&self) -> bool {
        let sum: u32 = self.phases.iter().map(|p| p.duration_days).sum();
        sum <= self.total_days
    }
}

/// Pipeline stages that can degrade without failing the report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DegradedComponent {
    Retrieval,
    HsModel,
    CertificationModel,
    Subsidies,
}

/// A recorded degradation: which stage, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Degradation {
    pub component: DegradedComponent,
    pub reason: String,
}

/// Audit fields attached to every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub generated_at: DateTime<Utc>,
    pub engine_version: String,
    pub rule_table_version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generative_model: Option<String>,
}

/// Ways an assembled report can violate its own invariants.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ReportIntegrityError {
    #[error("cost breakdown total does not match component sums")]
    InconsistentCosts,

    #[error("timeline phases exceed the total duration")]
    InconsistentTimeline,

    #[error("certification {0} has an invalid cost or timeline")]
    InvalidCertification(String),

    #[error("roadmap violates dependency ordering")]
    InvalidRoadmap,

    #[error("action plan does not have exactly {ACTION_PLAN_DAYS} days")]
    InvalidActionPlan,

    #[error("risk score {0} outside 0..=100")]
    RiskScoreOutOfRange(f32),

    #[error("prediction confidence {0} outside 0..=1")]
    ConfidenceOutOfRange(f32),
}

/// The complete export-readiness report for one query.
///
/// Immutable by convention: the assembler builds it once, after which no
/// stage mutates it. Regeneration produces a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReadinessReport {
    pub product_name: String,
    pub destination_country: String,

    pub hs_code: HsCodePrediction,

    /// Mandatory certifications first, then by priority.
    pub certifications: Vec<Certification>,

    pub risks: Vec<Risk>,

    /// Aggregate over `risks`, 0..=100.
    pub risk_score: f32,

    pub timeline: Timeline,
    pub costs: CostBreakdown,
    pub roadmap: Vec<RoadmapStep>,
    pub action_plan: ActionPlan,

    #[serde(default)]
    pub subsidies: Vec<Subsidy>,

    /// Every retrieved chunk consulted while building the report.
    #[serde(default)]
    pub evidence: Vec<Evidence>,

    /// Stages that degraded during generation, with reasons. Empty for a
    /// clean run.
    #[serde(default)]
    pub degradations: Vec<Degradation>,

    /// Set when any prediction needs a human check before the exporter
    /// acts on it.
    #[serde(default)]
    pub manual_review_recommended: bool,

    pub meta: ReportMeta,
}

impl ExportReadinessReport {
    /// Verify every cross-field invariant. The assembler calls this before
    /// releasing a report; a failure here means the report must not be
    /// emitted.
    pub fn validate(&self) -> Result<(), ReportIntegrityError> {
        if !self.costs.is_consistent() {
            return Err(ReportIntegrityError::InconsistentCosts);
        }
        if !self.timeline.is_consistent() {
            return Err(ReportIntegrityError::InconsistentTimeline);
        }
        for cert in &self.certifications {
            if !cert.is_valid() {
                return Err(ReportIntegrityError::InvalidCertification(cert.id.clone()));
            }
        }
        if !is_valid_roadmap(&self.roadmap) {
            return Err(ReportIntegrityError::InvalidRoadmap);
        }
        if !self.action_plan.is_valid() {
            return Err(ReportIntegrityError::InvalidActionPlan);
        }
        if !(0.0..=100.0).contains(&self.risk_score) {
            return Err(ReportIntegrityError::RiskScoreOutOfRange(self.risk_score));
        }
        if !(0.0..=1.0).contains(&self.hs_code.confidence) {
            return Err(ReportIntegrityError::ConfidenceOutOfRange(
                self.hs_code.confidence,
            ));
        }
        for alternative in &self.hs_code.alternatives {
            if !(0.0..=1.0).contains(&alternative.confidence) {
                return Err(ReportIntegrityError::ConfidenceOutOfRange(
                    alternative.confidence,
                ));
            }
        }
        Ok(())
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}
