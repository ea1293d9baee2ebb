//! Field mapping and row normalization
//!
//! Every source funnels its cells through [`RowNormalizer`], which is the one
//! place where missing, null-like and malformed values are resolved.

use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use cf_core::{CategoryField, MeasureField, Record, YearField};

use crate::config::NullConfig;
use crate::DataError;

/// Source column names for record fields
///
/// Keys are record field names (`"sector"`, `"end_year"`, ...). Fields without
/// an entry are read from a column of the same name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    renames: HashMap<String, String>,
}

impl FieldMapping {
    /// Map a record field to a differently named source column
    pub fn rename(mut self, field: &str, column: &str) -> Self {
        self.renames.insert(field.to_string(), column.to_string());
        self
    }

    /// Source column for a record field
    pub fn column_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.renames.get(field).map(String::as_str).unwrap_or(field)
    }

    /// Reject entries that name no record field
    pub fn validate(&self) -> Result<(), DataError> {
        match self.renames.keys().find(|key| !is_record_field(key)) {
            Some(unknown) => Err(DataError::UnknownField(unknown.clone())),
            None => Ok(()),
        }
    }
}

fn is_record_field(name: &str) -> bool {
    name == TITLE_FIELD
        || CategoryField::ALL.iter().any(|f| f.name() == name)
        || YearField::ALL.iter().any(|f| f.name() == name)
        || MeasureField::ALL.iter().any(|f| f.name() == name)
}

const TITLE_FIELD: &str = "title";

// Whole floats in this range convert to i64 without saturating
const YEAR_MIN: f64 = i64::MIN as f64;
const YEAR_MAX: f64 = i64::MAX as f64;

/// One raw cell as delivered by a source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Missing,
    Text(&'a str),
    Number(f64),
    Bool(bool),
}

/// Counters for values that could not be read as their field's type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    /// Year cells that were present but not an integer
    pub invalid_years: usize,
    /// Measure cells that were present but not numeric
    pub invalid_measures: usize,
}

impl LoadStats {
    pub fn has_anomalies(&self) -> bool {
        self.invalid_years > 0 || self.invalid_measures > 0
    }
}

/// Builds records from raw cells
pub struct RowNormalizer<'a> {
    fields: &'a FieldMapping,
    nulls: &'a NullConfig,
    stats: LoadStats,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(fields: &'a FieldMapping, nulls: &'a NullConfig) -> Self {
        Self {
            fields,
            nulls,
            stats: LoadStats::default(),
        }
    }

    /// Build one record, reading each cell by source column name
    pub fn normalize<'r, F>(&mut self, mut cell: F) -> Record
    where
        F: FnMut(&str) -> RawValue<'r>,
    {
        let mut record = Record::default();

        for field in CategoryField::ALL {
            let raw = cell(self.fields.column_for(field.name()));
            record.set_category(field, self.text(raw));
        }
        for field in YearField::ALL {
            let raw = cell(self.fields.column_for(field.name()));
            record.set_year(field, self.year(raw));
        }
        for field in MeasureField::ALL {
            let raw = cell(self.fields.column_for(field.name()));
            record.set_measure(field, self.measure(raw));
        }
        record.title = self.text(cell(self.fields.column_for(TITLE_FIELD)));

        self.stats.rows += 1;
        record
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    fn text(&self, raw: RawValue<'_>) -> Option<String> {
        match raw {
            RawValue::Missing => None,
            RawValue::Text(text) if self.nulls.is_null(text) => None,
            RawValue::Text(text) => Some(text.to_string()),
            RawValue::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(format!("{}", n as i64)),
            RawValue::Number(n) => Some(n.to_string()),
            RawValue::Bool(b) => Some(b.to_string()),
        }
    }

    fn year(&mut self, raw: RawValue<'_>) -> Option<i64> {
        let number = match raw {
            RawValue::Missing => return None,
            RawValue::Text(text) if self.nulls.is_null(text) => return None,
            RawValue::Text(text) => text.trim().parse::<f64>().ok(),
            RawValue::Number(n) => Some(n),
            RawValue::Bool(_) => None,
        };

        match number {
            Some(n) if n.fract() == 0.0 && (YEAR_MIN..YEAR_MAX).contains(&n) => Some(n as i64),
            _ => {
                self.stats.invalid_years += 1;
                None
            }
        }
    }

    fn measure(&mut self, raw: RawValue<'_>) -> Option<f64> {
        let number = match raw {
            RawValue::Missing => return None,
            RawValue::Text(text) if self.nulls.is_null(text) => return None,
            RawValue::Text(text) => text.trim().parse::<f64>().ok(),
            RawValue::Number(n) => Some(n),
            RawValue::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
        };

        // "inf" and "NaN" parse, but are not measurements
        match number {
            Some(n) if n.is_finite() => Some(n),
            _ => {
                self.stats.invalid_measures += 1;
                Some(f64::NAN)
            }
        }
    }
}
