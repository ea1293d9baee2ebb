//! Record model and the immutable record store

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Categorical record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryField {
    Sector,
    Country,
    Region,
    Topic,
    City,
    Pestle,
    Source,
    Swot,
}

impl CategoryField {
    pub const ALL: [CategoryField; 8] = [
        CategoryField::Sector,
        CategoryField::Country,
        CategoryField::Region,
        CategoryField::Topic,
        CategoryField::City,
        CategoryField::Pestle,
        CategoryField::Source,
        CategoryField::Swot,
    ];

    /// Field name as it appears in source data
    pub fn name(&self) -> &'static str {
        match self {
            CategoryField::Sector => "sector",
            CategoryField::Country => "country",
            CategoryField::Region => "region",
            CategoryField::Topic => "topic",
            CategoryField::City => "city",
            CategoryField::Pestle => "pestle",
            CategoryField::Source => "source",
            CategoryField::Swot => "swot",
        }
    }
}

/// Integer year fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearField {
    StartYear,
    EndYear,
}

impl YearField {
    pub const ALL: [YearField; 2] = [YearField::StartYear, YearField::EndYear];

    pub fn name(&self) -> &'static str {
        match self {
            YearField::StartYear => "start_year",
            YearField::EndYear => "end_year",
        }
    }
}

/// Numeric measure fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureField {
    Intensity,
    Relevance,
    Impact,
    Likelihood,
}

impl MeasureField {
    pub const ALL: [MeasureField; 4] = [
        MeasureField::Intensity,
        MeasureField::Relevance,
        MeasureField::Impact,
        MeasureField::Likelihood,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MeasureField::Intensity => "intensity",
            MeasureField::Relevance => "relevance",
            MeasureField::Impact => "impact",
            MeasureField::Likelihood => "likelihood",
        }
    }
}

/// One input datum
///
/// Every field is optional. A measure that was present but not numeric is
/// stored as `Some(NaN)` so it still reads as non-numeric downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub sector: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub topic: Option<String>,
    pub city: Option<String>,
    pub pestle: Option<String>,
    pub source: Option<String>,
    pub swot: Option<String>,
    pub start_year: Option<i64>,
    pub end_year: Option<i64>,
    pub intensity: Option<f64>,
    pub relevance: Option<f64>,
    pub impact: Option<f64>,
    pub likelihood: Option<f64>,
    pub title: Option<String>,
}

impl Record {
    /// Get a categorical field, `None` when missing
    pub fn category(&self, field: CategoryField) -> Option<&str> {
        self.category_slot(field).as_deref()
    }

    /// Get a year field, `None` when missing
    pub fn year(&self, field: YearField) -> Option<i64> {
        match field {
            YearField::StartYear => self.start_year,
            YearField::EndYear => self.end_year,
        }
    }

    /// Get a year field as a plot coordinate, `NaN` when missing
    pub fn year_value(&self, field: YearField) -> f64 {
        self.year(field).map(|y| y as f64).unwrap_or(f64::NAN)
    }

    /// Get a measure as a plot coordinate, `NaN` when missing or non-numeric
    pub fn measure(&self, field: MeasureField) -> f64 {
        self.measure_slot(field).unwrap_or(f64::NAN)
    }

    pub fn set_category(&mut self, field: CategoryField, value: Option<String>) {
        *self.category_slot_mut(field) = value;
    }

    pub fn set_year(&mut self, field: YearField, value: Option<i64>) {
        match field {
            YearField::StartYear => self.start_year = value,
            YearField::EndYear => self.end_year = value,
        }
    }

    pub fn set_measure(&mut self, field: MeasureField, value: Option<f64>) {
        match field {
            MeasureField::Intensity => self.intensity = value,
            MeasureField::Relevance => self.relevance = value,
            MeasureField::Impact => self.impact = value,
            MeasureField::Likelihood => self.likelihood = value,
        }
    }

    /// Builder form of [`Record::set_category`]
    pub fn with_category(mut self, field: CategoryField, value: impl Into<String>) -> Self {
        self.set_category(field, Some(value.into()));
        self
    }

    /// Builder form of [`Record::set_year`]
    pub fn with_year(mut self, field: YearField, value: i64) -> Self {
        self.set_year(field, Some(value));
        self
    }

    /// Builder form of [`Record::set_measure`]
    pub fn with_measure(mut self, field: MeasureField, value: f64) -> Self {
        self.set_measure(field, Some(value));
        self
    }

    fn category_slot(&self, field: CategoryField) -> &Option<String> {
        match field {
            CategoryField::Sector => &self.sector,
            CategoryField::Country => &self.country,
            CategoryField::Region => &self.region,
            CategoryField::Topic => &self.topic,
            CategoryField::City => &self.city,
            CategoryField::Pestle => &self.pestle,
            CategoryField::Source => &self.source,
            CategoryField::Swot => &self.swot,
        }
    }

    fn category_slot_mut(&mut self, field: CategoryField) -> &mut Option<String> {
        match field {
            CategoryField::Sector => &mut self.sector,
            CategoryField::Country => &mut self.country,
            CategoryField::Region => &mut self.region,
            CategoryField::Topic => &mut self.topic,
            CategoryField::City => &mut self.city,
            CategoryField::Pestle => &mut self.pestle,
            CategoryField::Source => &mut self.source,
            CategoryField::Swot => &mut self.swot,
        }
    }

    fn measure_slot(&self, field: MeasureField) -> Option<f64> {
        match field {
            MeasureField::Intensity => self.intensity,
            MeasureField::Relevance => self.relevance,
            MeasureField::Impact => self.impact,
            MeasureField::Likelihood => self.likelihood,
        }
    }
}

/// The loaded dataset
///
/// Built once from a complete record sequence and never appended to,
/// removed from or reordered afterwards. Share it with [`RecordStore::shared`].
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Create a store from a complete record sequence
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Wrap the store for read-only sharing across pipelines
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_read_as_absent() {
        let record = Record::default().with_category(CategoryField::Sector, "Energy");

        assert_eq!(record.category(CategoryField::Sector), Some("Energy"));
        assert_eq!(record.category(CategoryField::Country), None);
        assert_eq!(record.year(YearField::EndYear), None);
        assert!(record.year_value(YearField::EndYear).is_nan());
        assert!(record.measure(MeasureField::Intensity).is_nan());
    }

    #[test]
    fn test_non_numeric_measure_stays_nan() {
        let mut record = Record::default();
        record.set_measure(MeasureField::Impact, Some(f64::NAN));

        assert!(record.impact.is_some());
        assert!(record.measure(MeasureField::Impact).is_nan());
    }

    #[test]
    fn test_store_preserves_order() {
        let store: RecordStore = (0..4)
            .map(|year| Record::default().with_year(YearField::EndYear, 2020 + year))
            .collect();

        let years: Vec<_> = store.iter().filter_map(|r| r.end_year).collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023]);
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(2).and_then(|r| r.end_year), Some(2022));
    }

    #[test]
    fn test_field_names_match_source_columns() {
        let names: Vec<_> = CategoryField::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names[..4], ["sector", "country", "region", "topic"]);
        assert_eq!(YearField::EndYear.name(), "end_year");
        assert_eq!(MeasureField::Relevance.name(), "relevance");
    }
}
