use std::collections::HashSet;

use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::filters::filter_by_year;
use crate::tables::{BoundaryTable, MetricTable, GEOMETRY, REGION_CODE, REGION_NAME, VALUE, YEAR};

/// Name the metric table gives a joined region; boundaries keep `region_name`.
pub const METRIC_REGION_NAME: &str = "metric_region_name";

/// Position of the matched row within the year's metric rows; ties in the
/// marker ranking follow it.
pub const METRIC_ORDER: &str = "metric_order";

const BOUNDARY_ORDER: &str = "boundary_order";

/// Boundaries left-joined with one year of metric rows.
///
/// Holds one row per boundary, in boundary order, with columns
/// `region_code`, `region_name`, `geometry`, `metric_region_name`, `year`,
/// `value` and `metric_order`. The last four are null where no metric row
/// matched.
#[derive(Debug, Clone)]
pub struct JoinedView {
    df: DataFrame,
    year: i32,
}

/// Per-boundary value used to shade the choropleth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethValue {
    pub region_code: String,
    pub region_name: String,
    pub value: Option<f64>,
}

impl JoinedView {
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Number of boundaries that received a metric value.
    pub fn matched_count(&self) -> Result<usize> {
        let values = self.df.column(VALUE)?;
        Ok(values.len() - values.null_count())
    }

    /// Fails with [`PipelineError::JoinMismatch`] when no boundary matched.
    pub fn ensure_matched(&self) -> Result<()> {
        if self.matched_count()? == 0 {
            return Err(PipelineError::JoinMismatch { year: self.year });
        }
        Ok(())
    }

    pub fn choropleth_values(&self) -> Result<Vec<ChoroplethValue>> {
        let codes = self.df.column(REGION_CODE)?.str()?;
        let names = self.df.column(REGION_NAME)?.str()?;
        let values = self.df.column(VALUE)?.f64()?;

        Ok((0..self.df.height())
            .map(|idx| ChoroplethValue {
                region_code: codes.get(idx).unwrap_or_default().to_string(),
                region_name: names.get(idx).unwrap_or_default().to_string(),
                value: values.get(idx),
            })
            .collect())
    }
}

/// Left-joins `boundaries` with the rows of `records` recorded for `year`.
///
/// Metric rows are matched on the normalized region code. Only the first
/// metric row per code survives, so the output always has exactly one row per
/// boundary. Metric rows without a boundary are dropped.
pub fn join(boundaries: &BoundaryTable, records: &MetricTable, year: i32) -> Result<JoinedView> {
    let for_year = filter_by_year(records, year)?;
    let metrics = first_per_code(for_year.frame())?;

    let right = metrics.lazy().with_row_index(METRIC_ORDER, None).select([
        col(REGION_CODE),
        col(REGION_NAME).alias(METRIC_REGION_NAME),
        col(YEAR),
        col(VALUE),
        col(METRIC_ORDER).cast(DataType::Int64),
    ]);

    let df = boundaries
        .frame()
        .clone()
        .lazy()
        .with_row_index(BOUNDARY_ORDER, None)
        .join(
            right,
            [col(REGION_CODE)],
            [col(REGION_CODE)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([BOUNDARY_ORDER], SortMultipleOptions::default())
        .select([
            col(REGION_CODE),
            col(REGION_NAME),
            col(GEOMETRY),
            col(METRIC_REGION_NAME),
            col(YEAR),
            col(VALUE),
            col(METRIC_ORDER),
        ])
        .collect()?;

    debug!(
        year,
        boundaries = boundaries.height(),
        joined = df.height(),
        "joined boundaries with metric rows"
    );

    Ok(JoinedView { df, year })
}

/// Keeps the first row for each region code, preserving row order.
pub(crate) fn first_per_code(df: &DataFrame) -> Result<DataFrame> {
    let codes = df.column(REGION_CODE)?.str()?;

    let mut seen: HashSet<&str> = HashSet::with_capacity(df.height());
    let keep: Vec<bool> = codes
        .into_iter()
        .map(|code| match code {
            Some(code) => seen.insert(code),
            None => false,
        })
        .collect();

    let dropped = keep.iter().filter(|kept| !**kept).count();
    if dropped == 0 {
        return Ok(df.clone());
    }

    debug!(dropped, "dropping duplicate metric rows per region code");
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}
