use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::filters::{filter_by_year, filter_province_level};
use crate::geometry::{centroid_from_geojson, Point};
use crate::join::{first_per_code, JoinedView, METRIC_ORDER, METRIC_REGION_NAME};
use crate::tables::{MetricTable, GEOMETRY, REGION_CODE, REGION_NAME, VALUE, YEAR};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// 1-based position in the view.
    pub rank: usize,
    pub region_code: String,
    pub region_name: String,
    pub value: f64,
    pub year: i32,
    /// Marker position; only present for entries ranked from joined geometry.
    pub centroid: Option<Point>,
}

/// Regions ordered by value, highest first. Equal values keep input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedView {
    pub entries: Vec<RankedEntry>,
}

impl RankedView {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter()
    }

    /// `(region_name, value)` pairs, the shape the bar chart consumes.
    pub fn labels(&self) -> Vec<(&str, f64)> {
        self.entries
            .iter()
            .map(|entry| (entry.region_name.as_str(), entry.value))
            .collect()
    }
}

/// The `n` highest-valued joined regions, each with a marker centroid.
///
/// Boundaries without a metric value are never ranked. A larger `n` than
/// there are valued rows returns all of them.
pub fn top_n(joined: &JoinedView, n: usize) -> Result<RankedView> {
    let df = joined.frame();
    let codes = df.column(REGION_CODE)?.str()?;
    let boundary_names = df.column(REGION_NAME)?.str()?;
    let metric_names = df.column(METRIC_REGION_NAME)?.str()?;
    let geometry = df.column(GEOMETRY)?.str()?;
    let values = df.column(VALUE)?.f64()?;
    let metric_order = df.column(METRIC_ORDER)?.i64()?;

    let mut candidates = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let (Some(code), Some(value)) = (codes.get(idx), values.get(idx)) else {
            continue;
        };
        let name = metric_names
            .get(idx)
            .or_else(|| boundary_names.get(idx))
            .unwrap_or(code);
        let order = metric_order.get(idx).unwrap_or(i64::MAX);
        candidates.push((idx, code, name, value, order));
    }

    // Ties follow metric row order, matching `rank_all`, not boundary order.
    candidates.sort_by_key(|(_, _, _, _, order)| *order);
    sort_descending(&mut candidates, |(_, _, _, value, _)| *value);

    let entries = candidates
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(position, (idx, code, name, value, _))| {
            let centroid = geometry.get(idx).and_then(|text| {
                centroid_from_geojson(text)
                    .map_err(|err| warn!(region_code = code, %err, "no marker centroid"))
                    .ok()
            });
            RankedEntry {
                rank: position + 1,
                region_code: code.to_string(),
                region_name: name.to_string(),
                value,
                year: joined.year(),
                centroid,
            }
        })
        .collect();

    Ok(RankedView { entries })
}

/// Every province-level region of `year`, highest value first.
pub fn rank_all(records: &MetricTable, year: i32) -> Result<RankedView> {
    let provinces = filter_province_level(&filter_by_year(records, year)?)?;
    let df = first_per_code(provinces.frame())?;

    let codes = df.column(REGION_CODE)?.str()?;
    let names = df.column(REGION_NAME)?.str()?;
    let years = df.column(YEAR)?.i32()?;
    let values = df.column(VALUE)?.f64()?;

    let mut candidates = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let (Some(code), Some(value)) = (codes.get(idx), values.get(idx)) else {
            continue;
        };
        candidates.push((
            code,
            names.get(idx).unwrap_or(code),
            years.get(idx).unwrap_or(year),
            value,
        ));
    }

    sort_descending(&mut candidates, |(_, _, _, value)| *value);

    let entries = candidates
        .into_iter()
        .enumerate()
        .map(|(position, (code, name, year, value))| RankedEntry {
            rank: position + 1,
            region_code: code.to_string(),
            region_name: name.to_string(),
            value,
            year,
            centroid: None,
        })
        .collect();

    Ok(RankedView { entries })
}

// `sort_by` is stable, so equal values stay in input order.
fn sort_descending<T>(items: &mut [T], value: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| value(b).total_cmp(&value(a)));
}
