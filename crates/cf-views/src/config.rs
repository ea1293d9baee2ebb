//! Dashboard configuration

use std::path::Path;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use cf_core::PredicateSet;

use crate::aggregate::CellPolicy;
use crate::chart::{ChartKind, ChartSpec, Reduction};

/// Per-chart overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub chart: ChartKind,

    /// Replaces the chart's default predicate set
    #[serde(default)]
    pub predicates: Option<PredicateSet>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Dashboard-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Overrides for individual charts; charts not listed use their defaults
    pub charts: Vec<ChartConfig>,

    /// How the heatmap combines records sharing a cell
    pub cell_policy: CellPolicy,
}

impl DashboardConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dashboard config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid dashboard config {}", path.display()))
    }

    /// Pipelines for every enabled chart, in dashboard order
    pub fn chart_specs(&self) -> Vec<ChartSpec> {
        ChartKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let overrides = self.charts.iter().find(|c| c.chart == kind);
                if overrides.map(|c| !c.enabled).unwrap_or(false) {
                    return None;
                }

                let mut spec = kind.default_spec();
                if let Some(predicates) = overrides.and_then(|c| c.predicates) {
                    spec.predicates = predicates;
                }
                if let Reduction::Matrix { policy, .. } = &mut spec.reduction {
                    *policy = self.cell_policy;
                }
                Some(spec)
            })
            .collect()
    }
}
