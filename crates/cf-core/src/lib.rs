//! Core functionality for the cross-filter dashboard
//! 
//! This crate provides the record model, the filter state shared by every
//! chart, and the event plumbing the dashboard publishes on.

pub mod events;
pub mod filter;
pub mod record;

// Re-export commonly used types
pub use filter::{FilterDimension, FilterError, FilterSnapshot, FilterState, FilterValue, PredicateSet};
pub use record::{CategoryField, MeasureField, Record, RecordStore, YearField};
pub use data::DataSource;

pub mod data {
    use crate::record::RecordStore;
    
    /// Trait for dataset sources
    ///
    /// A source is read exactly once, before any filter event is handled.
    #[async_trait::async_trait]
    pub trait DataSource: Send + Sync {
        /// Load every record, in source order
        async fn load_all(&self) -> anyhow::Result<RecordStore>;
        
        /// Get the source name/path
        fn source_name(&self) -> &str;
    }
}
