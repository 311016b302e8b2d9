pub mod aggregate;
pub mod dashboard;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod join;
pub mod keys;
pub mod metric;
pub mod ranking;
pub mod selection;
pub mod series;
pub mod tables;

pub use dashboard::{Dashboard, DashboardView, Notice};
pub use error::{PipelineError, Result};
pub use metric::Metric;
pub use selection::FilterSelection;
pub use tables::{BoundaryTable, MetricTable};
