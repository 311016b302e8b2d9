use polars::prelude::*;

use crate::error::{PipelineError, Result};
use crate::keys::PROVINCE_SUFFIX;
use crate::tables::{MetricTable, REGION_CODE, REGION_NAME, YEAR};

/// Parses a year coming from a filter widget.
pub fn parse_year(raw: &str) -> Result<i32> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i32>()
        .map_err(|_| PipelineError::Validation(format!("year '{trimmed}' is not numeric")))
}

/// Rows recorded for `year`. An absent year yields an empty table.
pub fn filter_by_year(records: &MetricTable, year: i32) -> Result<MetricTable> {
    filter_with(records, col(YEAR).eq(lit(year)))
}

/// Rows whose region code carries the province suffix.
pub fn filter_province_level(records: &MetricTable) -> Result<MetricTable> {
    filter_with(
        records,
        col(REGION_CODE).str().ends_with(lit(PROVINCE_SUFFIX)),
    )
}

pub fn filter_region(records: &MetricTable, region_name: &str) -> Result<MetricTable> {
    filter_with(records, col(REGION_NAME).eq(lit(region_name)))
}

fn filter_with(records: &MetricTable, predicate: Expr) -> Result<MetricTable> {
    let df = records.frame().clone().lazy().filter(predicate).collect()?;
    Ok(MetricTable::from_normalized(df))
}
