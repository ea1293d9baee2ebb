//! Chart pipelines for the cross-filter dashboard
//!
//! Each chart selects the records passing its own filter dimensions, reduces
//! them to an aggregate and derives the scale domains the renderer draws
//! with. The [`Dashboard`] decides which charts rerun when a filter changes.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod emitter;
pub mod selector;

pub use aggregate::{Aggregate, CategoryHistogram, CellMatrix, CellPolicy, Point, SizedPoint};
pub use chart::{ChartKind, ChartSpec, Projection, Reduction, UnknownChart};
pub use config::{ChartConfig, DashboardConfig};
pub use dashboard::Dashboard;
pub use domain::{DerivedDomain, Extent, NumericDomain, DEFAULT_EXTENT};
pub use emitter::{JsonLinesEmitter, NullEmitter, ProjectionEmitter};
pub use selector::{select, FilteredView};
