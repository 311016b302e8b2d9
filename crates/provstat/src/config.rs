// crates/provstat/src/config.rs

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use provstat_core::aggregate::FactFormat;
use provstat_core::selection::DEFAULT_TOP_N;
use provstat_core::{BoundaryTable, Dashboard, Metric, MetricTable};
use provstat_sources::{read_boundaries, read_metric_csv, BoundaryColumns, MetricColumns};
use serde::Deserialize;
use tracing::info;

pub const CONFIG_ENV: &str = "PROVSTAT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "provstat.toml";

#[derive(Debug, Deserialize)]
pub struct DashboardConfig {
    /// GeoJSON FeatureCollection with one feature per province.
    pub boundaries: PathBuf,
    #[serde(default)]
    pub boundary_columns: BoundaryColumns,
    /// Headers shared by every metric file unless a metric overrides them.
    #[serde(default)]
    pub metric_columns: MetricColumns,
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
    /// Region code of the nationwide aggregate rows, e.g. `9999`.
    #[serde(default)]
    pub national_code: Option<String>,
    #[serde(rename = "metric", default)]
    pub metrics: Vec<MetricSource>,
}

#[derive(Debug, Deserialize)]
pub struct MetricSource {
    pub metric: Metric,
    pub path: PathBuf,
    #[serde(default)]
    pub columns: Option<MetricColumns>,
    #[serde(default)]
    pub fact: FactFormat,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// `--config` wins, then `PROVSTAT_CONFIG`, then `./provstat.toml`.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env::var(CONFIG_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&content, base)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses `content`, resolving relative data paths against `base`.
    pub fn from_toml(content: &str, base: &Path) -> Result<Self> {
        let mut config: DashboardConfig = toml::from_str(content)?;

        ensure!(!config.metrics.is_empty(), "no [[metric]] entries configured");
        let mut seen = HashSet::new();
        for source in &config.metrics {
            ensure!(
                seen.insert(source.metric),
                "metric {} is configured more than once",
                source.metric
            );
        }

        config.boundaries = resolve(base, &config.boundaries);
        for source in &mut config.metrics {
            source.path = resolve(base, &source.path);
        }
        Ok(config)
    }

    pub fn columns_for<'a>(&'a self, source: &'a MetricSource) -> &'a MetricColumns {
        source.columns.as_ref().unwrap_or(&self.metric_columns)
    }

    /// Loads every configured table. Any schema problem aborts startup.
    pub fn build_dashboard(&self) -> Result<Dashboard> {
        let raw_boundaries = read_boundaries(&self.boundaries, &self.boundary_columns)
            .with_context(|| format!("failed to load {}", self.boundaries.display()))?;
        let boundaries = BoundaryTable::from_frame(&raw_boundaries)
            .context("boundary file does not match the expected schema")?;
        info!(features = boundaries.height(), "boundaries loaded");

        let mut dashboard = Dashboard::new(boundaries);
        for source in &self.metrics {
            let raw = read_metric_csv(&source.path, self.columns_for(source))
                .with_context(|| format!("failed to load {}", source.path.display()))?;
            let table = MetricTable::from_frame(&raw)
                .with_context(|| format!("{} table does not match the expected schema", source.metric))?;
            dashboard = dashboard.with_metric(source.metric, table, source.fact.clone());
        }

        if let Some(code) = &self.national_code {
            dashboard = dashboard.with_national_code(code.as_str());
        }
        Ok(dashboard)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
