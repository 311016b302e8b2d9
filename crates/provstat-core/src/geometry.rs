use geojson::{GeoJson, Value as GeoJsonValue};
use serde::Serialize;
use thiserror::Error;

const AREA_EPSILON: f64 = 1e-12;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("geometry is not valid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
    #[error("expected a Polygon or MultiPolygon, found {0}")]
    UnsupportedType(&'static str),
    #[error("geometry has no usable coordinates")]
    Empty,
}

/// Planar position in GeoJSON axis order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

/// Representative point for marker placement, parsed from GeoJSON text.
///
/// Accepts a bare geometry or a feature wrapping one.
pub fn centroid_from_geojson(text: &str) -> Result<Point, GeometryError> {
    let geojson = text.parse::<GeoJson>()?;
    let value = match geojson {
        GeoJson::Geometry(geometry) => geometry.value,
        GeoJson::Feature(feature) => feature.geometry.ok_or(GeometryError::Empty)?.value,
        GeoJson::FeatureCollection(_) => {
            return Err(GeometryError::UnsupportedType("FeatureCollection"))
        }
    };
    centroid(&value)
}

/// Area-weighted centroid of a Polygon or MultiPolygon.
///
/// Interior rings subtract from their polygon. When every ring is degenerate
/// the mean of the exterior vertices is returned instead.
pub fn centroid(value: &GeoJsonValue) -> Result<Point, GeometryError> {
    let polygons: Vec<&Vec<Vec<Vec<f64>>>> = match value {
        GeoJsonValue::Polygon(rings) => vec![rings],
        GeoJsonValue::MultiPolygon(polygons) => polygons.iter().collect(),
        GeoJsonValue::Point(_) => return Err(GeometryError::UnsupportedType("Point")),
        GeoJsonValue::MultiPoint(_) => return Err(GeometryError::UnsupportedType("MultiPoint")),
        GeoJsonValue::LineString(_) => return Err(GeometryError::UnsupportedType("LineString")),
        GeoJsonValue::MultiLineString(_) => {
            return Err(GeometryError::UnsupportedType("MultiLineString"))
        }
        GeoJsonValue::GeometryCollection(_) => {
            return Err(GeometryError::UnsupportedType("GeometryCollection"))
        }
    };

    let mut area_sum = 0.0;
    let mut lon_sum = 0.0;
    let mut lat_sum = 0.0;

    for rings in &polygons {
        for (idx, ring) in rings.iter().enumerate() {
            let Some((area, lon, lat)) = ring_moments(ring) else {
                continue;
            };
            let weight = if idx == 0 { area.abs() } else { -area.abs() };
            area_sum += weight;
            lon_sum += weight * lon;
            lat_sum += weight * lat;
        }
    }

    if area_sum.abs() > AREA_EPSILON {
        return Ok(Point {
            lon: lon_sum / area_sum,
            lat: lat_sum / area_sum,
        });
    }

    vertex_mean(&polygons).ok_or(GeometryError::Empty)
}

/// Signed area and centroid of a single ring (shoelace formula).
fn ring_moments(ring: &[Vec<f64>]) -> Option<(f64, f64, f64)> {
    if ring.len() < 3 {
        return None;
    }

    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;

    for idx in 0..ring.len() {
        let current = &ring[idx];
        let next = &ring[(idx + 1) % ring.len()];
        if current.len() < 2 || next.len() < 2 {
            return None;
        }
        let cross = current[0] * next[1] - next[0] * current[1];
        twice_area += cross;
        cx += (current[0] + next[0]) * cross;
        cy += (current[1] + next[1]) * cross;
    }

    if twice_area.abs() <= AREA_EPSILON {
        return None;
    }

    let area = twice_area / 2.0;
    Some((area, cx / (6.0 * area), cy / (6.0 * area)))
}

fn vertex_mean(polygons: &[&Vec<Vec<Vec<f64>>>]) -> Option<Point> {
    let mut count = 0usize;
    let mut lon = 0.0;
    let mut lat = 0.0;

    for rings in polygons {
        let Some(exterior) = rings.first() else {
            continue;
        };
        for position in exterior {
            if position.len() >= 2 {
                lon += position[0];
                lat += position[1];
                count += 1;
            }
        }
    }

    (count > 0).then(|| Point {
        lon: lon / count as f64,
        lat: lat / count as f64,
    })
}
