pub mod boundaries;
pub mod columns;
pub mod errors;
pub mod metrics;

pub use boundaries::{boundaries_from_str, read_boundaries};
pub use columns::{BoundaryColumns, MetricColumns};
pub use errors::SourceError;
pub use metrics::{metric_frame_from_bytes, read_metric_csv};
