use metrics_exporter_prometheus::PrometheusHandle;
use mortgage_risk::config::RiskConfig;
use mortgage_risk::error::AppError;
use mortgage_risk::lending::{PolicyConfig, RegionDirectory, RegionRiskTable, RiskEngine};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the configured CSV snapshot, or the embedded table when none is configured.
pub(crate) fn load_region_table(path: Option<&Path>) -> Result<RegionRiskTable, AppError> {
    match path {
        Some(path) => {
            let table = RegionRiskTable::from_path(path)?;
            info!(path = %path.display(), regions = table.len(), "loaded region snapshot");
            Ok(table)
        }
        None => Ok(RegionRiskTable::standard()),
    }
}

pub(crate) fn build_engine(config: &RiskConfig) -> Result<RiskEngine, AppError> {
    let table = load_region_table(config.region_table.as_deref())?;
    let engine = RiskEngine::new(PolicyConfig::standard(), RegionDirectory::new(table))?;
    Ok(engine)
}
