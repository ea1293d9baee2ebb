//! Filter state shared by all charts
//!
//! Each dimension holds at most one selected value. Charts never read the
//! live [`FilterState`]; a recomputation pass works on a [`FilterSnapshot`]
//! taken when the pass starts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::record::{CategoryField, Record, YearField};

/// Errors raised while parsing filter input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unknown filter dimension: {0}")]
    UnknownDimension(String),

    #[error("Invalid year value: {0}")]
    InvalidYear(String),
}

/// Independently adjustable filter dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDimension {
    Country,
    Year,
    Topic,
    Sector,
    Region,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 5] = [
        FilterDimension::Country,
        FilterDimension::Year,
        FilterDimension::Topic,
        FilterDimension::Sector,
        FilterDimension::Region,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FilterDimension::Country => "country",
            FilterDimension::Year => "year",
            FilterDimension::Topic => "topic",
            FilterDimension::Sector => "sector",
            FilterDimension::Region => "region",
        }
    }

    /// Categorical field tested by this dimension, `None` for `year`
    pub fn category_field(&self) -> Option<CategoryField> {
        match self {
            FilterDimension::Country => Some(CategoryField::Country),
            FilterDimension::Topic => Some(CategoryField::Topic),
            FilterDimension::Sector => Some(CategoryField::Sector),
            FilterDimension::Region => Some(CategoryField::Region),
            FilterDimension::Year => None,
        }
    }

    /// Whether `record` satisfies `value` on this dimension
    ///
    /// A record missing the field never matches a set value.
    pub fn matches(&self, record: &Record, value: &FilterValue) -> bool {
        match (self.category_field(), value) {
            (Some(field), FilterValue::Text(text)) => record.category(field) == Some(text.as_str()),
            (Some(field), FilterValue::Year(year)) => {
                record.category(field) == Some(year.to_string().as_str())
            }
            (None, FilterValue::Year(year)) => record.year(YearField::EndYear) == Some(*year),
            (None, FilterValue::Text(text)) => record
                .year(YearField::EndYear)
                .map(|year| year.to_string() == *text)
                .unwrap_or(false),
        }
    }

    /// Parse a raw control value into the value type this dimension expects
    pub fn parse_value(&self, raw: &str) -> Result<FilterValue, FilterError> {
        match self {
            FilterDimension::Year => raw
                .trim()
                .parse::<i64>()
                .map(FilterValue::Year)
                .map_err(|_| FilterError::InvalidYear(raw.to_string())),
            _ => Ok(FilterValue::Text(raw.to_string())),
        }
    }

    fn index(&self) -> usize {
        match self {
            FilterDimension::Country => 0,
            FilterDimension::Year => 1,
            FilterDimension::Topic => 2,
            FilterDimension::Sector => 3,
            FilterDimension::Region => 4,
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterDimension {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FilterDimension::ALL
            .into_iter()
            .find(|dim| dim.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FilterError::UnknownDimension(s.to_string()))
    }
}

/// A selected filter value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Year(i64),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(text) => f.write_str(text),
            FilterValue::Year(year) => write!(f, "{}", year),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Year(value)
    }
}

type Slots = [Option<FilterValue>; 5];

/// Current value of every filter dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    values: Slots,
}

impl FilterState {
    /// Create a filter state with every dimension unset
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dimension: FilterDimension) -> Option<&FilterValue> {
        self.values[dimension.index()].as_ref()
    }

    /// Set or unset one dimension, returning the previous value
    pub fn set(&mut self, dimension: FilterDimension, value: Option<FilterValue>) -> Option<FilterValue> {
        std::mem::replace(&mut self.values[dimension.index()], value)
    }

    /// Unset every dimension
    pub fn clear(&mut self) {
        self.values = Slots::default();
    }

    /// Set dimensions and their values, in dimension order
    pub fn active(&self) -> impl Iterator<Item = (FilterDimension, &FilterValue)> + '_ {
        active_slots(&self.values)
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Take an immutable copy for one recomputation pass
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            values: self.values.clone(),
        }
    }
}

/// Immutable copy of the filter state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSnapshot {
    values: Slots,
}

impl FilterSnapshot {
    pub fn get(&self, dimension: FilterDimension) -> Option<&FilterValue> {
        self.values[dimension.index()].as_ref()
    }

    pub fn active(&self) -> impl Iterator<Item = (FilterDimension, &FilterValue)> + '_ {
        active_slots(&self.values)
    }
}

fn active_slots(values: &Slots) -> impl Iterator<Item = (FilterDimension, &FilterValue)> + '_ {
    FilterDimension::ALL
        .into_iter()
        .filter_map(move |dim| values[dim.index()].as_ref().map(|value| (dim, value)))
}

/// The filter dimensions one chart reacts to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FilterDimension>", into = "Vec<FilterDimension>")]
pub struct PredicateSet {
    mask: u8,
}

impl PredicateSet {
    /// Create a predicate set from dimensions
    pub fn new(dimensions: impl IntoIterator<Item = FilterDimension>) -> Self {
        let mut set = Self::default();
        for dim in dimensions {
            set.insert(dim);
        }
        set
    }

    /// Predicate set over every dimension
    pub fn all() -> Self {
        Self::new(FilterDimension::ALL)
    }

    pub fn insert(&mut self, dimension: FilterDimension) {
        self.mask |= 1 << dimension.index();
    }

    pub fn remove(&mut self, dimension: FilterDimension) {
        self.mask &= !(1 << dimension.index());
    }

    pub fn contains(&self, dimension: FilterDimension) -> bool {
        self.mask & (1 << dimension.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = FilterDimension> + '_ {
        FilterDimension::ALL.into_iter().filter(move |dim| self.contains(*dim))
    }

    /// Whether `record` passes every set dimension in this predicate set
    pub fn matches(&self, record: &Record, snapshot: &FilterSnapshot) -> bool {
        snapshot
            .active()
            .filter(|(dim, _)| self.contains(*dim))
            .all(|(dim, value)| dim.matches(record, value))
    }
}

impl From<Vec<FilterDimension>> for PredicateSet {
    fn from(dimensions: Vec<FilterDimension>) -> Self {
        Self::new(dimensions)
    }
}

impl From<PredicateSet> for Vec<FilterDimension> {
    fn from(set: PredicateSet) -> Self {
        set.iter().collect()
    }
}
