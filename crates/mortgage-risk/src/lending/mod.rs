//! Mortgage lending risk evaluation: regional reference data, the policy rule catalog,
//! and the evaluator that turns a loan application into an auditable verdict.

pub mod domain;
pub mod evaluation;
pub mod regions;
pub mod router;

pub use domain::{FormNumber, LoanApplication, LoanApplicationForm};
pub use evaluation::{
    Decision, EvaluationError, Grade, HighValueThreshold, PolicyConfig, PolicyConfigError,
    RegionResolution, RiskAssessment, RiskAssessmentView, RiskEngine, RuleKind, Severity,
    TriggeredRule,
};
pub use regions::{
    OverheatBand, RankedRegion, RegionDirectory, RegionRiskEntry, RegionRiskTable,
    RegionSource, RegionTableError,
};
pub use router::risk_router;
