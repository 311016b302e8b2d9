use std::path::Path;

use geojson::{Feature, GeoJson, Value as GeoJsonValue};
use polars::prelude::*;
use provstat_core::keys::normalize_key;
use provstat_core::tables::{GEOMETRY, REGION_CODE, REGION_NAME};
use serde_json::Value;
use tracing::{debug, warn};

use crate::columns::BoundaryColumns;
use crate::errors::SourceError;

/// Reads a GeoJSON FeatureCollection of region boundaries.
pub fn read_boundaries(path: &Path, columns: &BoundaryColumns) -> Result<DataFrame, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = boundaries_from_str(&text, columns)?;
    debug!(path = %path.display(), features = df.height(), "read boundary file");
    Ok(df)
}

/// One row per polygonal feature: `region_code`, `region_name` and the
/// feature geometry as GeoJSON text. All other properties are discarded.
///
/// Features without a code or without polygonal geometry are skipped.
pub fn boundaries_from_str(text: &str, columns: &BoundaryColumns) -> Result<DataFrame, SourceError> {
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(_) => return Err(SourceError::NotFeatureCollection("Feature")),
        GeoJson::Geometry(_) => return Err(SourceError::NotFeatureCollection("Geometry")),
    };

    let mut codes = Vec::with_capacity(features.len());
    let mut names = Vec::with_capacity(features.len());
    let mut geometries = Vec::with_capacity(features.len());

    for (idx, feature) in features.into_iter().enumerate() {
        let Some(code) = property_text(&feature, &columns.region_code) else {
            warn!(feature = idx, property = %columns.region_code, "feature has no region code");
            continue;
        };
        let code = normalize_key(&code);

        let Some(geometry) = feature.geometry.clone() else {
            warn!(feature = idx, region_code = %code, "feature has no geometry");
            continue;
        };
        if !matches!(
            geometry.value,
            GeoJsonValue::Polygon(_) | GeoJsonValue::MultiPolygon(_)
        ) {
            warn!(feature = idx, region_code = %code, "feature geometry is not polygonal");
            continue;
        }

        let name = property_text(&feature, &columns.region_name).unwrap_or_else(|| code.clone());
        codes.push(code);
        names.push(name);
        geometries.push(GeoJson::Geometry(geometry).to_string());
    }

    if codes.is_empty() {
        return Err(SourceError::NoFeatures);
    }

    let df = df![
        REGION_CODE => codes,
        REGION_NAME => names,
        GEOMETRY => geometries,
    ]?;
    Ok(df)
}

fn property_text(feature: &Feature, key: &str) -> Option<String> {
    match feature.properties.as_ref()?.get(key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
