pub mod batch_source;
pub mod csv_source;
pub mod json_source;

pub use batch_source::BatchSource;
pub use csv_source::CsvSource;
pub use json_source::JsonSource;

use cf_core::RecordStore;
use tracing::{info, warn};

use crate::schema::LoadStats;

/// Log the outcome of one load and wrap the records in a store
fn finish_load(source_name: &str, records: Vec<cf_core::Record>, stats: LoadStats) -> RecordStore {
    if stats.has_anomalies() {
        warn!(
            source = source_name,
            invalid_years = stats.invalid_years,
            invalid_measures = stats.invalid_measures,
            "Dataset contains values that are not numeric"
        );
    }
    info!(source = source_name, rows = records.len(), "Loaded dataset");
    RecordStore::new(records)
}
