use std::sync::Arc;

use crate::lending::domain::LoanApplication;
use crate::lending::evaluation::{PolicyConfig, RiskEngine};
use crate::lending::regions::{RegionRiskEntry, RegionRiskTable};

pub(super) const EPSILON: f64 = 1e-9;

pub(super) fn standard_engine() -> RiskEngine {
    RiskEngine::standard()
}

pub(super) fn engine_with_regions(entries: Vec<RegionRiskEntry>) -> RiskEngine<Arc<RegionRiskTable>> {
    let table = RegionRiskTable::new(entries).expect("valid region table");
    RiskEngine::new(PolicyConfig::standard(), Arc::new(table)).expect("standard policy is valid")
}

pub(super) fn application(
    existing_property_count: i64,
    region_id: &str,
    total_price: i64,
    is_presale: bool,
) -> LoanApplication {
    LoanApplication::new(existing_property_count, region_id, total_price, is_presale)
}

pub(super) fn first_time_taipei() -> LoanApplication {
    application(0, "台北市", 50_000_000, false)
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}
