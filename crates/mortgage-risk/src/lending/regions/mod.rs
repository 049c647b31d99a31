//! Regional overheat reference data consulted by the rule engine.
//!
//! A [`RegionRiskTable`] is an immutable snapshot. Refreshes replace the whole snapshot
//! through [`RegionDirectory`], so an evaluation that already holds a snapshot keeps
//! seeing it in full.

mod loader;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use super::evaluation::PolicyConfig;

const MAX_OVERHEAT_INDEX: u8 = 100;

/// One row of the regional bubble table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRiskEntry {
    pub region_id: String,
    pub overheat_index: u8,
    pub yoy_change_percent: f64,
}

impl RegionRiskEntry {
    pub fn new(region_id: impl Into<String>, overheat_index: u8, yoy_change_percent: f64) -> Self {
        Self {
            region_id: region_id.into(),
            overheat_index,
            yoy_change_percent,
        }
    }

    pub fn band(&self, config: &PolicyConfig) -> OverheatBand {
        OverheatBand::classify(self.overheat_index, config)
    }

    fn check(&self) -> Result<(), RegionTableError> {
        if self.region_id.trim().is_empty() {
            return Err(RegionTableError::InvalidEntry {
                region_id: self.region_id.clone(),
                field: "region_id",
                reason: "must not be blank".to_string(),
            });
        }
        if self.overheat_index > MAX_OVERHEAT_INDEX {
            return Err(RegionTableError::InvalidEntry {
                region_id: self.region_id.clone(),
                field: "overheat_index",
                reason: format!("{} exceeds {MAX_OVERHEAT_INDEX}", self.overheat_index),
            });
        }
        if !self.yoy_change_percent.is_finite() || self.yoy_change_percent < 0.0 {
            return Err(RegionTableError::InvalidEntry {
                region_id: self.region_id.clone(),
                field: "yoy_change_percent",
                reason: format!("{} is not a non-negative number", self.yoy_change_percent),
            });
        }
        Ok(())
    }
}

/// Watchlist classification of a region's overheat index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverheatBand {
    Low,
    Medium,
    High,
}

impl OverheatBand {
    /// Bands follow the policy's overheat thresholds, so a band always names the
    /// overheat rule the evaluator fires for the same index.
    pub fn classify(overheat_index: u8, config: &PolicyConfig) -> Self {
        if overheat_index > config.high_overheat_threshold {
            Self::High
        } else if overheat_index > config.medium_overheat_threshold {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Entry enriched with its band, sorted hottest first by [`RegionRiskTable::ranked`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRegion {
    pub rank: usize,
    pub region_id: String,
    pub overheat_index: u8,
    pub yoy_change_percent: f64,
    pub band: OverheatBand,
    pub band_label: &'static str,
}

/// Immutable lookup from region identifier to overheat data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionRiskTable {
    entries: BTreeMap<String, RegionRiskEntry>,
}

impl RegionRiskTable {
    pub fn new(entries: Vec<RegionRiskEntry>) -> Result<Self, RegionTableError> {
        let mut table = BTreeMap::new();
        for entry in entries {
            entry.check()?;
            if table.contains_key(&entry.region_id) {
                return Err(RegionTableError::Duplicate(entry.region_id));
            }
            table.insert(entry.region_id.clone(), entry);
        }
        Ok(Self { entries: table })
    }

    /// Snapshot published alongside the lending dashboard.
    pub fn standard() -> Self {
        let entries = standard_entries()
            .into_iter()
            .map(|entry| (entry.region_id.clone(), entry))
            .collect();
        Self { entries }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RegionTableError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegionTableError> {
        let entries = loader::parse_entries(reader)?;
        if entries.is_empty() {
            return Err(RegionTableError::Empty);
        }
        Self::new(entries)
    }

    /// Returns `None` for unrecognized ids; callers decide on the default.
    pub fn lookup(&self, region_id: &str) -> Option<&RegionRiskEntry> {
        self.entries.get(region_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegionRiskEntry> {
        self.entries.values()
    }

    pub fn ranked(&self, config: &PolicyConfig) -> Vec<RankedRegion> {
        let mut entries: Vec<&RegionRiskEntry> = self.entries.values().collect();
        entries.sort_by(|left, right| {
            right
                .overheat_index
                .cmp(&left.overheat_index)
                .then_with(|| left.region_id.cmp(&right.region_id))
        });

        entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| {
                let band = entry.band(config);
                RankedRegion {
                    rank: position + 1,
                    region_id: entry.region_id.clone(),
                    overheat_index: entry.overheat_index,
                    yoy_change_percent: entry.yoy_change_percent,
                    band,
                    band_label: band.label(),
                }
            })
            .collect()
    }
}

fn standard_entries() -> Vec<RegionRiskEntry> {
    vec![
        RegionRiskEntry::new("新竹市", 88, 18.2),
        RegionRiskEntry::new("新竹縣", 72, 15.8),
        RegionRiskEntry::new("台中市", 65, 12.1),
        RegionRiskEntry::new("桃園市", 55, 9.5),
        RegionRiskEntry::new("台南市", 42, 7.2),
        RegionRiskEntry::new("高雄市", 38, 5.8),
        RegionRiskEntry::new("新北市", 35, 4.2),
        RegionRiskEntry::new("台北市", 28, 2.8),
    ]
}

/// Source of region snapshots for the evaluator.
pub trait RegionSource: Send + Sync {
    /// One consistent snapshot; the evaluator holds it for a whole pass.
    fn snapshot(&self) -> Arc<RegionRiskTable>;
}

impl RegionSource for Arc<RegionRiskTable> {
    fn snapshot(&self) -> Arc<RegionRiskTable> {
        Arc::clone(self)
    }
}

/// Shared, swappable handle to the current snapshot.
#[derive(Debug, Clone)]
pub struct RegionDirectory {
    current: Arc<RwLock<Arc<RegionRiskTable>>>,
}

impl RegionDirectory {
    pub fn new(table: RegionRiskTable) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    pub fn current(&self) -> Arc<RegionRiskTable> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Swaps in a new snapshot and hands back the one it replaced.
    pub fn replace(&self, table: RegionRiskTable) -> Arc<RegionRiskTable> {
        let next = Arc::new(table);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

impl Default for RegionDirectory {
    fn default() -> Self {
        Self::new(RegionRiskTable::standard())
    }
}

impl RegionSource for RegionDirectory {
    fn snapshot(&self) -> Arc<RegionRiskTable> {
        self.current()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegionTableError {
    #[error("failed to read region snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid region snapshot CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("region '{region_id}' has invalid {field}: {reason}")]
    InvalidEntry {
        region_id: String,
        field: &'static str,
        reason: String,
    },
    #[error("region '{0}' appears more than once in the snapshot")]
    Duplicate(String),
    #[error("region snapshot contains no entries")]
    Empty,
}
