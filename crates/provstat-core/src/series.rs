use std::collections::BTreeMap;

use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::filters::filter_region;
use crate::tables::{MetricTable, REGION_CODE, YEAR, VALUE};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: f64,
}

/// Two series aligned on a shared year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairedPoint {
    pub year: i32,
    pub a: f64,
    pub b: f64,
}

/// Yearly values of one region, oldest first.
///
/// The first row recorded for a year wins and rows without a value are
/// skipped. An empty region name yields an empty series.
pub fn time_series(records: &MetricTable, region_name: &str) -> Result<Vec<SeriesPoint>> {
    if region_name.trim().is_empty() {
        return Ok(Vec::new());
    }
    let region = filter_region(records, region_name)?;
    points_by_year(region.frame())
}

/// Yearly values of the rows carrying `region_code`, oldest first.
pub fn time_series_by_code(records: &MetricTable, region_code: &str) -> Result<Vec<SeriesPoint>> {
    let df = records
        .frame()
        .clone()
        .lazy()
        .filter(col(REGION_CODE).eq(lit(region_code)))
        .collect()?;
    points_by_year(&df)
}

/// Inner join of two series on year, ascending. Years present in only one
/// series are dropped.
pub fn pair_series(a: &[SeriesPoint], b: &[SeriesPoint]) -> Vec<PairedPoint> {
    let mut right: BTreeMap<i32, f64> = BTreeMap::new();
    for point in b {
        right.entry(point.year).or_insert(point.value);
    }

    let mut left: BTreeMap<i32, f64> = BTreeMap::new();
    for point in a {
        left.entry(point.year).or_insert(point.value);
    }

    left.into_iter()
        .filter_map(|(year, a)| right.get(&year).map(|&b| PairedPoint { year, a, b }))
        .collect()
}

/// A region's trend paired with the nationwide aggregate series stored under
/// `national_code`.
pub fn national_comparison(
    records: &MetricTable,
    region_name: &str,
    national_code: &str,
) -> Result<Vec<PairedPoint>> {
    let region = time_series(records, region_name)?;
    if region.is_empty() {
        return Ok(Vec::new());
    }
    let national = time_series_by_code(records, national_code)?;
    Ok(pair_series(&region, &national))
}

fn points_by_year(df: &DataFrame) -> Result<Vec<SeriesPoint>> {
    let years = df.column(YEAR)?.i32()?;
    let values = df.column(VALUE)?.f64()?;

    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for idx in 0..df.height() {
        if let (Some(year), Some(value)) = (years.get(idx), values.get(idx)) {
            by_year.entry(year).or_insert(value);
        }
    }

    Ok(by_year
        .into_iter()
        .map(|(year, value)| SeriesPoint { year, value })
        .collect())
}
