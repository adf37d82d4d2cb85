pub mod certification;
pub mod evidence;
pub mod hs;
pub mod money;
pub mod plan;
pub mod query;
pub mod report;
pub mod risk;
pub mod roadmap;
pub mod subsidy;

pub use certification::{
    Certification, CertificationType, EstimateProvenance, Priority, Resolution,
};
pub use evidence::Evidence;
pub use hs::{hs_chapter, HsCodeAlternative, HsCodePrediction};
pub use money::{CostBreakdown, CostComponent, Money, MoneyRange};
pub use plan::{ActionPlan, DayPlan, PlanTask, TaskCategory, ACTION_PLAN_DAYS};
pub use query::{
    BusinessType, CompanySize, PaymentMode, PriceRange, QueryInput, QueryValidationError,
};
pub use report::{
    Degradation, DegradedComponent, ExportReadinessReport, ReportIntegrityError, ReportMeta,
    Timeline, TimelinePhase,
};
pub use risk::{aggregate_risk_score, Risk, Severity};
pub use roadmap::{is_valid_roadmap, RoadmapStep, StepKind};
pub use subsidy::Subsidy;
