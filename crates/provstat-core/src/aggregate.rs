use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filters::{filter_by_year, filter_region};
use crate::tables::MetricTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Sum,
    Mean,
}

/// Display options for a summary figure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactFormat {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub decimals: usize,
}

/// A summary figure and its rendered text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fact {
    pub title: String,
    pub value: f64,
    pub display: String,
}

impl Fact {
    pub fn new(title: impl Into<String>, value: f64, format: &FactFormat) -> Self {
        Self {
            title: title.into(),
            value,
            display: format_fact(value, format),
        }
    }
}

/// Reduces the rows of `year` (optionally one region) after removing exact
/// duplicates.
///
/// `Mean` divides by the number of deduplicated rows, including rows whose
/// value is missing, and is 0 when nothing matches.
pub fn aggregate(
    records: &MetricTable,
    year: i32,
    region_name: Option<&str>,
    reducer: Reducer,
) -> Result<f64> {
    let mut filtered = filter_by_year(records, year)?;
    if let Some(name) = region_name.filter(|name| !name.trim().is_empty()) {
        filtered = filter_region(&filtered, name)?;
    }

    let mut seen = HashSet::new();
    let mut count = 0usize;
    let mut total = 0.0;
    for record in filtered.records()? {
        let key = (
            record.region_code,
            record.region_name,
            record.year,
            record.value.map(f64::to_bits),
        );
        if !seen.insert(key) {
            continue;
        }
        count += 1;
        total += record.value.unwrap_or(0.0);
    }

    Ok(match reducer {
        Reducer::Sum => total,
        Reducer::Mean if count == 0 => 0.0,
        Reducer::Mean => total / count as f64,
    })
}

/// Rounds to `format.decimals` places and groups the integer digits in
/// thousands, e.g. `1234567.891` with two decimals renders as `1,234,567.89`.
pub fn format_fact(value: f64, format: &FactFormat) -> String {
    if !value.is_finite() {
        return format!("{}{}", format.prefix, value);
    }

    let rendered = format!("{:.*}", format.decimals, value.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };

    match fraction {
        Some(fraction) => format!("{sign}{}{grouped}.{fraction}", format.prefix),
        None => format!("{sign}{}{grouped}", format.prefix),
    }
}
