// crates/provstat-core/src/tables.rs

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::keys::{is_province_code, normalize_key_column};

pub const REGION_CODE: &str = "region_code";
pub const REGION_NAME: &str = "region_name";
pub const YEAR: &str = "year";
pub const VALUE: &str = "value";
pub const GEOMETRY: &str = "geometry";

const METRIC_COLUMNS: [&str; 4] = [REGION_CODE, REGION_NAME, YEAR, VALUE];
const BOUNDARY_COLUMNS: [&str; 3] = [REGION_CODE, REGION_NAME, GEOMETRY];

/// One row of a metric table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub region_code: String,
    pub region_name: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// Schema-checked yearly metric table with normalized region codes.
///
/// Cloning is cheap; the underlying columns are shared and never mutated.
#[derive(Debug, Clone)]
pub struct MetricTable {
    df: DataFrame,
}

impl MetricTable {
    /// Validates and normalizes a raw frame carrying `region_code`,
    /// `region_name`, `year` and `value` columns of any castable dtype.
    pub fn from_frame(raw: &DataFrame) -> Result<Self> {
        require_columns(raw, "metric", &METRIC_COLUMNS)?;

        let codes = normalize_key_column(raw, REGION_CODE)?;
        let names = raw.column(REGION_NAME)?.cast(&DataType::String)?;
        let years = year_column(raw)?;
        let values = finite_values(raw)?;

        let df = DataFrame::new(vec![codes.into(), names, years.into(), values.into()])?;

        let missing_years = df.column(YEAR)?.null_count();
        if missing_years > 0 && missing_years == df.height() {
            return Err(PipelineError::UnusableColumn {
                table: "metric",
                column: YEAR.to_string(),
            });
        }
        let df = if missing_years > 0 {
            warn!(rows = missing_years, "dropping metric rows without a usable year");
            df.lazy().filter(col(YEAR).is_not_null()).collect()?
        } else {
            df
        };

        debug!(rows = df.height(), "metric table ingested");
        Ok(Self { df })
    }

    pub(crate) fn from_normalized(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Distinct years in ascending order.
    pub fn years(&self) -> Result<Vec<i32>> {
        let years = self.df.column(YEAR)?.i32()?;
        let distinct: BTreeSet<i32> = years.into_iter().flatten().collect();
        Ok(distinct.into_iter().collect())
    }

    pub fn latest_year(&self) -> Result<Option<i32>> {
        Ok(self.years()?.last().copied())
    }

    /// Sorted, distinct names of province-level rows.
    pub fn province_names(&self) -> Result<Vec<String>> {
        let codes = self.df.column(REGION_CODE)?.str()?;
        let names = self.df.column(REGION_NAME)?.str()?;

        let mut distinct = BTreeSet::new();
        for (code, name) in codes.into_iter().zip(names.into_iter()) {
            if let (Some(code), Some(name)) = (code, name) {
                if is_province_code(code) {
                    distinct.insert(name.to_string());
                }
            }
        }
        Ok(distinct.into_iter().collect())
    }

    pub fn records(&self) -> Result<Vec<MetricRecord>> {
        let codes = self.df.column(REGION_CODE)?.str()?;
        let names = self.df.column(REGION_NAME)?.str()?;
        let years = self.df.column(YEAR)?.i32()?;
        let values = self.df.column(VALUE)?.f64()?;

        let mut records = Vec::with_capacity(self.df.height());
        for idx in 0..self.df.height() {
            let (Some(code), Some(year)) = (codes.get(idx), years.get(idx)) else {
                continue;
            };
            records.push(MetricRecord {
                region_code: code.to_string(),
                region_name: names.get(idx).unwrap_or_default().to_string(),
                year,
                value: values.get(idx),
            });
        }
        Ok(records)
    }
}

/// Schema-checked region boundaries; geometry is kept as GeoJSON text.
#[derive(Debug, Clone)]
pub struct BoundaryTable {
    df: DataFrame,
}

impl BoundaryTable {
    pub fn from_frame(raw: &DataFrame) -> Result<Self> {
        require_columns(raw, "boundary", &BOUNDARY_COLUMNS)?;

        let codes = normalize_key_column(raw, REGION_CODE)?;
        let names = raw.column(REGION_NAME)?.cast(&DataType::String)?;
        let geometry = raw.column(GEOMETRY)?.cast(&DataType::String)?;

        let df = DataFrame::new(vec![codes.into(), names, geometry])?;

        let mut seen = BTreeSet::new();
        for code in df.column(REGION_CODE)?.str()?.into_iter().flatten() {
            if !seen.insert(code) {
                warn!(region_code = code, "boundary code appears more than once");
            }
        }

        debug!(rows = df.height(), "boundary table ingested");
        Ok(Self { df })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }
}

/// Years as Int32. Integral float renderings such as `2023.0` are accepted;
/// anything else becomes null.
fn year_column(raw: &DataFrame) -> Result<Series> {
    let years = raw.column(YEAR)?.cast(&DataType::Float64)?;
    let parsed: Vec<Option<i32>> = years
        .f64()?
        .into_iter()
        .map(|year| {
            year.filter(|y| y.fract() == 0.0 && *y >= i32::MIN as f64 && *y <= i32::MAX as f64)
                .map(|y| y as i32)
        })
        .collect();
    Ok(Series::new(YEAR.into(), parsed))
}

/// Values as Float64 with NaN and infinities turned into nulls.
fn finite_values(raw: &DataFrame) -> Result<Series> {
    let values = raw.column(VALUE)?.cast(&DataType::Float64)?;

    let mut non_finite = 0usize;
    let cleaned: Vec<Option<f64>> = values
        .f64()?
        .into_iter()
        .map(|value| match value {
            Some(value) if !value.is_finite() => {
                non_finite += 1;
                None
            }
            other => other,
        })
        .collect();

    if non_finite > 0 {
        warn!(rows = non_finite, "treating non-finite metric values as missing");
    }
    Ok(Series::new(VALUE.into(), cleaned))
}

fn require_columns(df: &DataFrame, table: &'static str, columns: &[&str]) -> Result<()> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(PipelineError::Schema {
                table,
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}
