//! Distinct value index backing the filter controls

use std::collections::BTreeSet;
use serde::Serialize;
use cf_core::{CategoryField, RecordStore, YearField};

/// Sorted distinct values offered by each filter control
///
/// Missing values are listed once, as `None`, after every present value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<Option<i64>>,
    pub countries: Vec<Option<String>>,
    pub sectors: Vec<Option<String>>,
    pub topics: Vec<Option<String>>,
    pub regions: Vec<Option<String>>,
    pub cities: Vec<Option<String>>,
    pub pestles: Vec<Option<String>>,
    pub sources: Vec<Option<String>>,
    pub swots: Vec<Option<String>>,
}

impl FilterOptions {
    /// Build option lists from the loaded dataset
    pub fn from_store(store: &RecordStore) -> Self {
        Self {
            years: sorted_missing_last(store.iter().map(|r| r.year(YearField::EndYear))),
            countries: distinct(store, CategoryField::Country),
            sectors: distinct(store, CategoryField::Sector),
            topics: distinct(store, CategoryField::Topic),
            regions: distinct(store, CategoryField::Region),
            cities: distinct(store, CategoryField::City),
            pestles: distinct(store, CategoryField::Pestle),
            sources: distinct(store, CategoryField::Source),
            swots: distinct(store, CategoryField::Swot),
        }
    }

    /// Option list for one categorical field
    pub fn for_category(&self, field: CategoryField) -> &[Option<String>] {
        match field {
            CategoryField::Country => &self.countries,
            CategoryField::Sector => &self.sectors,
            CategoryField::Topic => &self.topics,
            CategoryField::Region => &self.regions,
            CategoryField::City => &self.cities,
            CategoryField::Pestle => &self.pestles,
            CategoryField::Source => &self.sources,
            CategoryField::Swot => &self.swots,
        }
    }
}

fn distinct(store: &RecordStore, field: CategoryField) -> Vec<Option<String>> {
    sorted_missing_last(store.iter().map(|r| r.category(field).map(str::to_string)))
}

fn sorted_missing_last<T: Ord>(values: impl Iterator<Item = Option<T>>) -> Vec<Option<T>> {
    let mut missing = false;
    let present: BTreeSet<T> = values
        .filter_map(|value| {
            missing |= value.is_none();
            value
        })
        .collect();

    let mut options: Vec<Option<T>> = present.into_iter().map(Some).collect();
    if missing {
        options.push(None);
    }
    options
}
