use serde::{Deserialize, Serialize};

use crate::metric::Metric;

pub const DEFAULT_TOP_N: usize = 5;

/// One request's filter state.
///
/// `year` is kept as the text the widget produced; it is validated when the
/// selection is rendered. No year means the latest year of the metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub metric: Metric,
    #[serde(default)]
    pub axis_y: Option<Metric>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl FilterSelection {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            axis_y: None,
            year: None,
            region: None,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_axis_y(mut self, metric: Metric) -> Self {
        self.axis_y = Some(metric);
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// The selected region, ignoring blank entries.
    pub fn region_name(&self) -> Option<&str> {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
