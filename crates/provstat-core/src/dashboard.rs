// crates/provstat-core/src/dashboard.rs

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, Fact, FactFormat, Reducer};
use crate::error::{PipelineError, Result};
use crate::filters::parse_year;
use crate::join::{join, ChoroplethValue};
use crate::keys::normalize_key;
use crate::metric::Metric;
use crate::ranking::{rank_all, top_n, RankedView};
use crate::selection::FilterSelection;
use crate::series::{national_comparison, pair_series, time_series, PairedPoint, SeriesPoint};
use crate::tables::{BoundaryTable, MetricTable};

#[derive(Debug, Clone)]
struct MetricEntry {
    table: MetricTable,
    format: FactFormat,
}

/// Session state: the boundary table and every loaded metric table.
///
/// Built once at startup and shared read-only; each call to
/// [`Dashboard::render`] derives fresh views without touching the tables.
#[derive(Debug, Clone)]
pub struct Dashboard {
    boundaries: BoundaryTable,
    metrics: BTreeMap<Metric, MetricEntry>,
    national_code: Option<String>,
}

/// Something the presentation layer should surface instead of a blank chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    UnknownMetric { metric: Metric },
    InvalidSelection { message: String },
    EmptyJoin { year: i32 },
    NoRegionSelected,
    RequestFailed { message: String },
}

impl From<&PipelineError> for Notice {
    fn from(err: &PipelineError) -> Self {
        match err {
            PipelineError::Validation(message) => Notice::InvalidSelection {
                message: message.clone(),
            },
            PipelineError::JoinMismatch { year } => Notice::EmptyJoin { year: *year },
            other => Notice::RequestFailed {
                message: other.to_string(),
            },
        }
    }
}

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: FilterSelection,
    pub year: Option<i32>,
    pub years: Vec<i32>,
    pub provinces: Vec<String>,
    pub map: Vec<ChoroplethValue>,
    pub markers: RankedView,
    pub ranking: RankedView,
    pub trend: Vec<SeriesPoint>,
    pub national_trend: Vec<PairedPoint>,
    pub scatter: Vec<PairedPoint>,
    pub facts: Vec<Fact>,
    pub notices: Vec<Notice>,
}

impl DashboardView {
    fn empty(selection: &FilterSelection) -> Self {
        Self {
            selection: selection.clone(),
            year: None,
            years: Vec::new(),
            provinces: Vec::new(),
            map: Vec::new(),
            markers: RankedView::default(),
            ranking: RankedView::default(),
            trend: Vec::new(),
            national_trend: Vec::new(),
            scatter: Vec::new(),
            facts: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Drops derived views but keeps the selector lists.
    fn clear_derived(&mut self) {
        self.year = None;
        self.map.clear();
        self.markers = RankedView::default();
        self.ranking = RankedView::default();
        self.trend.clear();
        self.national_trend.clear();
        self.scatter.clear();
        self.facts.clear();
    }

    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }
}

impl Dashboard {
    pub fn new(boundaries: BoundaryTable) -> Self {
        Self {
            boundaries,
            metrics: BTreeMap::new(),
            national_code: None,
        }
    }

    pub fn with_metric(mut self, metric: Metric, table: MetricTable, format: FactFormat) -> Self {
        info!(%metric, rows = table.height(), "registered metric table");
        self.metrics.insert(metric, MetricEntry { table, format });
        self
    }

    /// Enables the nationwide comparison series stored under `code`.
    pub fn with_national_code(mut self, code: impl Into<String>) -> Self {
        self.national_code = Some(normalize_key(&code.into()));
        self
    }

    pub fn boundaries(&self) -> &BoundaryTable {
        &self.boundaries
    }

    pub fn metric(&self, metric: Metric) -> Option<&MetricTable> {
        self.metrics.get(&metric).map(|entry| &entry.table)
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.metrics.keys().copied()
    }

    pub fn national_code(&self) -> Option<&str> {
        self.national_code.as_deref()
    }

    /// Runs the full pipeline for one selection.
    ///
    /// Never fails: bad input and empty joins come back as [`Notice`]s on a
    /// view that is still safe to render.
    pub fn render(&self, selection: &FilterSelection) -> DashboardView {
        let mut view = DashboardView::empty(selection);

        let Some(entry) = self.metrics.get(&selection.metric) else {
            warn!(metric = %selection.metric, "metric not loaded");
            view.notices.push(Notice::UnknownMetric {
                metric: selection.metric,
            });
            return view;
        };

        if let Err(err) = self.populate(entry, selection, &mut view) {
            warn!(%err, "selection rendered as empty view");
            view.clear_derived();
            view.notices.push(Notice::from(&err));
        }

        debug!(
            metric = %selection.metric,
            year = ?view.year,
            notices = view.notices.len(),
            "rendered dashboard view"
        );
        view
    }

    fn populate(
        &self,
        entry: &MetricEntry,
        selection: &FilterSelection,
        view: &mut DashboardView,
    ) -> Result<()> {
        let table = &entry.table;
        view.years = table.years()?;
        view.provinces = table.province_names()?;

        let year = resolve_year(selection, &view.years)?;
        view.year = Some(year);

        let region = match selection.region_name() {
            Some(name) if has_region(table, name)? => Some(name),
            Some(name) => {
                view.notices.push(Notice::InvalidSelection {
                    message: format!("region '{name}' not found for {}", selection.metric),
                });
                None
            }
            None => None,
        };

        let joined = join(&self.boundaries, table, year)?;
        if let Err(err) = joined.ensure_matched() {
            warn!(%err, "join produced no matches");
            view.notices.push(Notice::from(&err));
        }
        view.map = joined.choropleth_values()?;
        view.markers = top_n(&joined, selection.top_n)?;
        view.ranking = rank_all(table, year)?;

        match region {
            Some(name) => {
                view.trend = time_series(table, name)?;
                if let Some(code) = self.national_code.as_deref() {
                    view.national_trend = national_comparison(table, name, code)?;
                }
                if let Some(axis_y) = selection.axis_y {
                    match self.metrics.get(&axis_y) {
                        Some(other) => {
                            let other_series = time_series(&other.table, name)?;
                            view.scatter = pair_series(&view.trend, &other_series);
                        }
                        None => view.notices.push(Notice::UnknownMetric { metric: axis_y }),
                    }
                }
            }
            None => view.notices.push(Notice::NoRegionSelected),
        }

        let metric = selection.metric.as_str();
        view.facts = vec![
            Fact::new(
                format!("Total {metric}"),
                aggregate(table, year, region, Reducer::Sum)?,
                &entry.format,
            ),
            Fact::new(
                format!("Rata-rata {metric}"),
                aggregate(table, year, region, Reducer::Mean)?,
                &entry.format,
            ),
        ];

        Ok(())
    }
}

fn resolve_year(selection: &FilterSelection, years: &[i32]) -> Result<i32> {
    match selection.year.as_deref() {
        Some(raw) => {
            let year = parse_year(raw)?;
            if years.contains(&year) {
                Ok(year)
            } else {
                Err(PipelineError::Validation(format!(
                    "year {year} has no {} data",
                    selection.metric
                )))
            }
        }
        None => years.last().copied().ok_or_else(|| {
            PipelineError::Validation(format!("{} table has no years", selection.metric))
        }),
    }
}

fn has_region(table: &MetricTable, name: &str) -> Result<bool> {
    Ok(table
        .records()?
        .iter()
        .any(|record| record.region_name == name))
}
