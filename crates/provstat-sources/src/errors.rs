use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV read failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("metric file is missing column '{column}'")]
    MissingColumn { column: String },

    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("expected a FeatureCollection, found a {0}")]
    NotFeatureCollection(&'static str),

    #[error("boundary file contained no usable features")]
    NoFeatures,
}
