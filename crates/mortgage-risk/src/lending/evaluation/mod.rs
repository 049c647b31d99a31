mod config;
mod display;
mod policy;
mod rules;
mod validation;

#[cfg(test)]
mod tests;

pub use config::{HighValueThreshold, PolicyConfig, PolicyConfigError};
pub use policy::{Decision, Grade};
pub use rules::{RuleEffect, RuleKind, Severity};
pub use validation::EvaluationError;

use super::domain::LoanApplication;
use super::regions::{RegionDirectory, RegionRiskTable, RegionSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Stateless evaluator applying the policy catalog against the current region snapshot.
pub struct RiskEngine<S = RegionDirectory> {
    config: PolicyConfig,
    regions: S,
}

impl RiskEngine<RegionDirectory> {
    /// Standard policy over the embedded region snapshot.
    pub fn standard() -> Self {
        Self {
            config: PolicyConfig::standard(),
            regions: RegionDirectory::default(),
        }
    }
}

impl<S: RegionSource> RiskEngine<S> {
    pub fn new(config: PolicyConfig, regions: S) -> Result<Self, PolicyConfigError> {
        config.validate()?;
        Ok(Self { config, regions })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn regions(&self) -> &S {
        &self.regions
    }

    pub fn evaluate(&self, application: &LoanApplication) -> Result<RiskAssessment, EvaluationError> {
        let table = self.regions.snapshot();
        evaluate_with(&self.config, &table, application)
    }
}

/// Single evaluation pass against an explicit policy and snapshot. `config` must already
/// have passed [`PolicyConfig::validate`].
pub(crate) fn evaluate_with(
    config: &PolicyConfig,
    table: &RegionRiskTable,
    application: &LoanApplication,
) -> Result<RiskAssessment, EvaluationError> {
    validation::validate(application)?;

    let region = resolve_region(config, table, &application.region_id);
    let effects = rules::collect_effects(application, &region, config);
    let combined = rules::combine(&effects, config);

    let max_ltv = combined.max_ltv;
    let assessment = RiskAssessment {
        max_ltv,
        max_ltv_percent: display::round_to(max_ltv * 100.0, 1),
        risk_weight: display::round_to(combined.risk_weight, 2),
        suggested_loan_amount: application.total_price as f64 * max_ltv,
        grade: Grade::from_ltv(max_ltv),
        decision: Decision::from_ltv(max_ltv),
        triggered_rules: effects.into_iter().map(TriggeredRule::from).collect(),
        region,
    };

    debug!(
        region = %assessment.region.region_id,
        max_ltv = assessment.max_ltv_percent,
        risk_weight = assessment.risk_weight,
        grade = assessment.grade.label(),
        decision = assessment.decision.label(),
        "loan application evaluated"
    );

    Ok(assessment)
}

fn resolve_region(config: &PolicyConfig, table: &RegionRiskTable, region_id: &str) -> RegionResolution {
    match table.lookup(region_id) {
        Some(entry) => RegionResolution {
            region_id: entry.region_id.clone(),
            overheat_index: entry.overheat_index,
            matched: true,
        },
        None => {
            warn!(
                region = region_id,
                default_index = config.default_overheat_index,
                "region missing from snapshot, using default overheat index"
            );
            RegionResolution {
                region_id: region_id.to_string(),
                overheat_index: config.default_overheat_index,
                matched: false,
            }
        }
    }
}

/// Overheat index the rules saw, and whether it came from the snapshot or the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionResolution {
    pub region_id: String,
    pub overheat_index: u8,
    pub matched: bool,
}

/// Audit entry for one triggered rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredRule {
    pub rule: RuleKind,
    pub severity: Severity,
    pub explanation: String,
}

impl From<RuleEffect> for TriggeredRule {
    fn from(effect: RuleEffect) -> Self {
        Self {
            rule: effect.rule,
            severity: effect.severity,
            explanation: effect.explanation,
        }
    }
}

/// Complete verdict for one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub max_ltv: f64,
    pub max_ltv_percent: f64,
    pub risk_weight: f64,
    pub suggested_loan_amount: f64,
    pub grade: Grade,
    pub decision: Decision,
    pub triggered_rules: Vec<TriggeredRule>,
    pub region: RegionResolution,
}

impl RiskAssessment {
    pub fn explanations(&self) -> Vec<&str> {
        self.triggered_rules
            .iter()
            .map(|rule| rule.explanation.as_str())
            .collect()
    }

    pub fn fired(&self, rule: RuleKind) -> bool {
        self.triggered_rules.iter().any(|entry| entry.rule == rule)
    }

    /// Presentation-only rendering of the suggested amount.
    pub fn suggested_loan_display(&self) -> String {
        display::format_amount(self.suggested_loan_amount)
    }

    pub fn view(&self) -> RiskAssessmentView {
        RiskAssessmentView {
            max_ltv_percent: self.max_ltv_percent,
            risk_weight: self.risk_weight,
            suggested_loan_amount: self.suggested_loan_amount,
            suggested_loan_display: self.suggested_loan_display(),
            grade: self.grade,
            decision: self.decision,
            decision_summary: self.decision.summary(),
            triggered_rules: self
                .triggered_rules
                .iter()
                .map(|rule| rule.explanation.clone())
                .collect(),
            region_id: self.region.region_id.clone(),
            overheat_index: self.region.overheat_index,
            region_matched: self.region.matched,
        }
    }
}

/// Flattened assessment returned by the HTTP and CLI adapters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessmentView {
    pub max_ltv_percent: f64,
    pub risk_weight: f64,
    pub suggested_loan_amount: f64,
    pub suggested_loan_display: String,
    pub grade: Grade,
    pub decision: Decision,
    pub decision_summary: &'static str,
    pub triggered_rules: Vec<String>,
    pub region_id: String,
    pub overheat_index: u8,
    pub region_matched: bool,
}
