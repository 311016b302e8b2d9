// crates/provstat-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{table} table is missing required column '{column}'")]
    Schema {
        table: &'static str,
        column: String,
    },

    #[error("{table} table has no usable values in column '{column}'")]
    UnusableColumn {
        table: &'static str,
        column: String,
    },

    #[error("Invalid filter selection: {0}")]
    Validation(String),

    #[error("no boundary matched any metric row for year {year}")]
    JoinMismatch { year: i32 },

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl PipelineError {
    /// Schema failures abort pipeline construction; everything else is per-request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::Schema { .. } | PipelineError::UnusableColumn { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
