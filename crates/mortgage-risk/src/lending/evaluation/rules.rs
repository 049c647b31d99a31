use serde::{Deserialize, Serialize};

use super::super::domain::LoanApplication;
use super::config::PolicyConfig;
use super::display::{format_amount, format_percent};
use super::RegionResolution;

/// Catalog entries, declared in audit display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    OwnershipTier,
    HighValueProperty,
    Presale,
    OverheatHigh,
    OverheatMedium,
    MultiProperty,
}

impl RuleKind {
    pub const CATALOG: [RuleKind; 6] = [
        RuleKind::OwnershipTier,
        RuleKind::HighValueProperty,
        RuleKind::Presale,
        RuleKind::OverheatHigh,
        RuleKind::OverheatMedium,
        RuleKind::MultiProperty,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RuleKind::OwnershipTier => "Ownership tier",
            RuleKind::HighValueProperty => "High-value property",
            RuleKind::Presale => "Pre-sale unit",
            RuleKind::OverheatHigh => "Regional overheat (high)",
            RuleKind::OverheatMedium => "Regional overheat (medium)",
            RuleKind::MultiProperty => "Multi-property investor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warn,
    Critical,
}

impl Severity {
    pub fn marker(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Critical => "critical",
        }
    }
}

/// What a single triggered rule contributes to the verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEffect {
    pub rule: RuleKind,
    pub severity: Severity,
    pub base_cap: Option<f64>,
    pub ltv_cap_ceiling: Option<f64>,
    pub ltv_cap_multiplier: Option<f64>,
    pub risk_weight_delta: f64,
    pub explanation: String,
}

impl RuleEffect {
    fn new(rule: RuleKind, severity: Severity, detail: String) -> Self {
        Self {
            rule,
            severity,
            base_cap: None,
            ltv_cap_ceiling: None,
            ltv_cap_multiplier: None,
            risk_weight_delta: 0.0,
            explanation: format!("[{}] {}", severity.marker(), detail),
        }
    }
}

/// Accumulated numeric outcome of a set of effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CombinedEffects {
    pub max_ltv: f64,
    pub risk_weight: f64,
}

pub(crate) const BASE_RISK_WEIGHT: f64 = 1.0;

/// Runs every rule and returns the effects of those that fired, in catalog order.
pub(crate) fn collect_effects(
    application: &LoanApplication,
    region: &RegionResolution,
    config: &PolicyConfig,
) -> Vec<RuleEffect> {
    let mut effects = vec![ownership_tier(application, config)];
    effects.extend(high_value_property(application, config));
    effects.extend(presale(application, config));
    effects.extend(overheat_high(region, config));
    effects.extend(overheat_medium(region, config));
    effects.extend(multi_property(application, config));
    effects
}

/// `min(ceilings ∪ {base cap}) × Π(multipliers)`, independent of effect order.
pub(crate) fn combine(effects: &[RuleEffect], config: &PolicyConfig) -> CombinedEffects {
    let cap = effects
        .iter()
        .flat_map(|effect| effect.base_cap.into_iter().chain(effect.ltv_cap_ceiling))
        .fold(config.first_home_ltv_cap, f64::min);

    let multiplier: f64 = effects
        .iter()
        .filter_map(|effect| effect.ltv_cap_multiplier)
        .product();

    let risk_weight = BASE_RISK_WEIGHT
        + effects
            .iter()
            .map(|effect| effect.risk_weight_delta)
            .sum::<f64>();

    CombinedEffects {
        max_ltv: (cap * multiplier).clamp(0.0, config.first_home_ltv_cap),
        risk_weight,
    }
}

pub(crate) fn ownership_tier(application: &LoanApplication, config: &PolicyConfig) -> RuleEffect {
    let count = application.existing_property_count;
    let (severity, cap, detail) = match count {
        0 => (
            Severity::Info,
            config.first_home_ltv_cap,
            format!(
                "first-time buyer: LTV cap {}",
                format_percent(config.first_home_ltv_cap)
            ),
        ),
        1 => (
            Severity::Warn,
            config.second_home_ltv_cap,
            format!(
                "second home: LTV cap {}, no grace period",
                format_percent(config.second_home_ltv_cap)
            ),
        ),
        _ => (
            Severity::Critical,
            config.additional_home_ltv_cap,
            format!(
                "third home or more ({count} already owned): LTV cap {}",
                format_percent(config.additional_home_ltv_cap)
            ),
        ),
    };

    let mut effect = RuleEffect::new(RuleKind::OwnershipTier, severity, detail);
    effect.base_cap = Some(cap);
    effect
}

pub(crate) fn high_value_property(
    application: &LoanApplication,
    config: &PolicyConfig,
) -> Vec<RuleEffect> {
    config
        .high_value_thresholds_for(&application.region_id)
        .filter(|threshold| application.total_price >= threshold.min_total_price)
        .map(|threshold| {
            let mut effect = RuleEffect::new(
                RuleKind::HighValueProperty,
                Severity::Warn,
                format!(
                    "{} high-value property (>= {}): LTV capped at {}",
                    threshold.region_id,
                    format_amount(threshold.min_total_price as f64),
                    format_percent(threshold.ltv_ceiling)
                ),
            );
            effect.ltv_cap_ceiling = Some(threshold.ltv_ceiling);
            effect
        })
        .collect()
}

pub(crate) fn presale(application: &LoanApplication, config: &PolicyConfig) -> Option<RuleEffect> {
    if !application.is_presale {
        return None;
    }

    let mut effect = RuleEffect::new(
        RuleKind::Presale,
        Severity::Warn,
        format!(
            "pre-sale unit: LTV x{:.2}, risk weight +{:.2}",
            config.presale_ltv_multiplier, config.presale_risk_weight_delta
        ),
    );
    effect.ltv_cap_multiplier = Some(config.presale_ltv_multiplier);
    effect.risk_weight_delta = config.presale_risk_weight_delta;
    Some(effect)
}

pub(crate) fn overheat_high(region: &RegionResolution, config: &PolicyConfig) -> Option<RuleEffect> {
    if region.overheat_index <= config.high_overheat_threshold {
        return None;
    }

    let mut effect = RuleEffect::new(
        RuleKind::OverheatHigh,
        Severity::Critical,
        format!(
            "{} high bubble-risk region (index {}): risk weight +{:.2}",
            region.region_id, region.overheat_index, config.high_overheat_risk_weight_delta
        ),
    );
    effect.risk_weight_delta = config.high_overheat_risk_weight_delta;
    Some(effect)
}

pub(crate) fn overheat_medium(
    region: &RegionResolution,
    config: &PolicyConfig,
) -> Option<RuleEffect> {
    let index = region.overheat_index;
    if index <= config.medium_overheat_threshold || index > config.high_overheat_threshold {
        return None;
    }

    let mut effect = RuleEffect::new(
        RuleKind::OverheatMedium,
        Severity::Warn,
        format!(
            "{} medium bubble-risk region (index {index}): risk weight +{:.2}",
            region.region_id, config.medium_overheat_risk_weight_delta
        ),
    );
    effect.risk_weight_delta = config.medium_overheat_risk_weight_delta;
    Some(effect)
}

pub(crate) fn multi_property(
    application: &LoanApplication,
    config: &PolicyConfig,
) -> Option<RuleEffect> {
    if application.existing_property_count < config.multi_property_min_count {
        return None;
    }

    let mut effect = RuleEffect::new(
        RuleKind::MultiProperty,
        Severity::Warn,
        format!(
            "multi-property investor: risk weight +{:.2}",
            config.multi_property_risk_weight_delta
        ),
    );
    effect.risk_weight_delta = config.multi_property_risk_weight_delta;
    Some(effect)
}
