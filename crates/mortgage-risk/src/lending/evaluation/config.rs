use serde::{Deserialize, Serialize};

/// Overheat index assumed for regions missing from the snapshot.
const DEFAULT_OVERHEAT_INDEX: u8 = 50;
/// Indices strictly above this value are treated as high overheat.
const HIGH_OVERHEAT_THRESHOLD: u8 = 70;
/// Indices strictly above this value (and not high) are treated as medium overheat.
const MEDIUM_OVERHEAT_THRESHOLD: u8 = 50;

/// Price threshold above which a region's LTV cap is clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighValueThreshold {
    pub region_id: String,
    pub min_total_price: i64,
    pub ltv_ceiling: f64,
}

impl HighValueThreshold {
    pub fn new(region_id: impl Into<String>, min_total_price: i64, ltv_ceiling: f64) -> Self {
        Self {
            region_id: region_id.into(),
            min_total_price,
            ltv_ceiling,
        }
    }
}

/// Lending policy constants consumed by the rule catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub first_home_ltv_cap: f64,
    pub second_home_ltv_cap: f64,
    pub additional_home_ltv_cap: f64,
    pub high_value_thresholds: Vec<HighValueThreshold>,
    pub presale_ltv_multiplier: f64,
    pub presale_risk_weight_delta: f64,
    pub high_overheat_threshold: u8,
    pub high_overheat_risk_weight_delta: f64,
    pub medium_overheat_threshold: u8,
    pub medium_overheat_risk_weight_delta: f64,
    pub multi_property_min_count: i64,
    pub multi_property_risk_weight_delta: f64,
    pub default_overheat_index: u8,
}

impl PolicyConfig {
    /// Current central-bank selective credit controls.
    pub fn standard() -> Self {
        Self {
            first_home_ltv_cap: 0.80,
            second_home_ltv_cap: 0.60,
            additional_home_ltv_cap: 0.40,
            high_value_thresholds: vec![
                HighValueThreshold::new("台北市", 70_000_000, 0.60),
                HighValueThreshold::new("新北市", 60_000_000, 0.60),
            ],
            presale_ltv_multiplier: 0.90,
            presale_risk_weight_delta: 0.15,
            high_overheat_threshold: HIGH_OVERHEAT_THRESHOLD,
            high_overheat_risk_weight_delta: 0.25,
            medium_overheat_threshold: MEDIUM_OVERHEAT_THRESHOLD,
            medium_overheat_risk_weight_delta: 0.15,
            multi_property_min_count: 2,
            multi_property_risk_weight_delta: 0.20,
            default_overheat_index: DEFAULT_OVERHEAT_INDEX,
        }
    }

    pub fn high_value_thresholds_for<'a>(
        &'a self,
        region_id: &'a str,
    ) -> impl Iterator<Item = &'a HighValueThreshold> + 'a {
        self.high_value_thresholds
            .iter()
            .filter(move |threshold| threshold.region_id == region_id)
    }

    pub fn validate(&self) -> Result<(), PolicyConfigError> {
        check_ratio("first_home_ltv_cap", self.first_home_ltv_cap)?;
        check_ratio("second_home_ltv_cap", self.second_home_ltv_cap)?;
        check_ratio("additional_home_ltv_cap", self.additional_home_ltv_cap)?;

        if self.second_home_ltv_cap > self.first_home_ltv_cap
            || self.additional_home_ltv_cap > self.second_home_ltv_cap
        {
            return Err(PolicyConfigError::TierCapsNotDescending);
        }

        for threshold in &self.high_value_thresholds {
            check_ratio("ltv_ceiling", threshold.ltv_ceiling)?;
            if threshold.min_total_price <= 0 {
                return Err(PolicyConfigError::NonPositiveThreshold {
                    region_id: threshold.region_id.clone(),
                });
            }
        }

        if !(self.presale_ltv_multiplier > 0.0 && self.presale_ltv_multiplier <= 1.0) {
            return Err(PolicyConfigError::OutOfRange {
                field: "presale_ltv_multiplier",
                value: self.presale_ltv_multiplier,
            });
        }

        check_delta("presale_risk_weight_delta", self.presale_risk_weight_delta)?;
        check_delta(
            "high_overheat_risk_weight_delta",
            self.high_overheat_risk_weight_delta,
        )?;
        check_delta(
            "medium_overheat_risk_weight_delta",
            self.medium_overheat_risk_weight_delta,
        )?;
        check_delta(
            "multi_property_risk_weight_delta",
            self.multi_property_risk_weight_delta,
        )?;

        if self.medium_overheat_threshold > self.high_overheat_threshold {
            return Err(PolicyConfigError::OverheatThresholdsInverted {
                medium: self.medium_overheat_threshold,
                high: self.high_overheat_threshold,
            });
        }

        if self.default_overheat_index > 100 || self.high_overheat_threshold > 100 {
            return Err(PolicyConfigError::OutOfRange {
                field: "overheat index",
                value: f64::from(self.default_overheat_index.max(self.high_overheat_threshold)),
            });
        }

        Ok(())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::standard()
    }
}

fn check_ratio(field: &'static str, value: f64) -> Result<(), PolicyConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PolicyConfigError::OutOfRange { field, value })
    }
}

fn check_delta(field: &'static str, value: f64) -> Result<(), PolicyConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PolicyConfigError::OutOfRange { field, value })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyConfigError {
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("ownership tier caps must not increase with the number of owned properties")]
    TierCapsNotDescending,
    #[error("high-value threshold for '{region_id}' must be positive")]
    NonPositiveThreshold { region_id: String },
    #[error("medium overheat threshold {medium} exceeds high threshold {high}")]
    OverheatThresholdsInverted { medium: u8, high: u8 },
}
