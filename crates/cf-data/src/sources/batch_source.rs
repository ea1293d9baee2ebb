//! Arrow record batch source
//!
//! Lets a dashboard be fed from data that is already columnar in memory.

use std::borrow::Cow;
use ahash::AHashMap;
use async_trait::async_trait;
use arrow::array::{Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;
use cf_core::{Record, RecordStore};

use crate::config::LoadConfig;
use crate::schema::{LoadStats, RawValue, RowNormalizer};
use crate::DataError;

/// Data source over an in-memory Arrow batch
pub struct BatchSource {
    name: String,
    batch: RecordBatch,
    config: LoadConfig,
}

impl BatchSource {
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
            config: LoadConfig::default(),
        }
    }

    /// Use a custom load configuration
    pub fn with_config(mut self, config: LoadConfig) -> Self {
        self.config = config;
        self
    }

    /// Convert every row of a batch into a record
    pub fn records_from_batch(batch: &RecordBatch, config: &LoadConfig) -> Result<(Vec<Record>, LoadStats), DataError> {
        config.fields.validate()?;

        // Column name -> column position
        let schema = batch.schema();
        let columns: AHashMap<&str, usize> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.name().as_str(), idx))
            .collect();

        let mut normalizer = RowNormalizer::new(&config.fields, &config.null_config);
        let mut records = Vec::with_capacity(batch.num_rows());

        for row in 0..batch.num_rows() {
            // Cells rendered to text must outlive the raw views handed out below
            let cells = batch
                .columns()
                .iter()
                .map(|column| typed_cell(column, row))
                .collect::<Result<Vec<_>, _>>()?;

            records.push(normalizer.normalize(|name| {
                match columns.get(name).map(|&idx| &cells[idx]) {
                    Some(Cell::Raw(raw)) => *raw,
                    Some(Cell::Text(text)) => RawValue::Text(text.as_ref()),
                    None => RawValue::Missing,
                }
            }));
        }

        Ok((records, normalizer.stats()))
    }
}

enum Cell<'a> {
    Raw(RawValue<'static>),
    Text(Cow<'a, str>),
}

fn typed_cell(column: &ArrayRef, row: usize) -> Result<Cell<'_>, DataError> {
    if column.is_null(row) {
        return Ok(Cell::Raw(RawValue::Missing));
    }

    let any = column.as_any();
    let cell = if let Some(array) = any.downcast_ref::<StringArray>() {
        Cell::Text(Cow::Borrowed(array.value(row)))
    } else if let Some(array) = any.downcast_ref::<LargeStringArray>() {
        Cell::Text(Cow::Borrowed(array.value(row)))
    } else if let Some(array) = any.downcast_ref::<Float64Array>() {
        Cell::Raw(RawValue::Number(array.value(row)))
    } else if let Some(array) = any.downcast_ref::<Float32Array>() {
        Cell::Raw(RawValue::Number(array.value(row) as f64))
    } else if let Some(array) = any.downcast_ref::<Int64Array>() {
        Cell::Raw(RawValue::Number(array.value(row) as f64))
    } else if let Some(array) = any.downcast_ref::<Int32Array>() {
        Cell::Raw(RawValue::Number(array.value(row) as f64))
    } else if let Some(array) = any.downcast_ref::<BooleanArray>() {
        Cell::Raw(RawValue::Bool(array.value(row)))
    } else {
        let text = arrow::util::display::array_value_to_string(column, row)?;
        Cell::Text(Cow::Owned(text))
    };
    Ok(cell)
}

#[async_trait]
impl cf_core::data::DataSource for BatchSource {
    async fn load_all(&self) -> anyhow::Result<RecordStore> {
        let (records, stats) = Self::records_from_batch(&self.batch, &self.config)?;
        Ok(super::finish_load(self.source_name(), records, stats))
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
