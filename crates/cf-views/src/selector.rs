//! View selection: the records one chart sees

use cf_core::{FilterSnapshot, PredicateSet, Record, RecordStore};

/// Records passing one chart's predicate set, in store order
///
/// Borrowed from the store and rebuilt for every pass.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }
}

impl<'a> FromIterator<&'a Record> for FilteredView<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Select the records satisfying every set dimension in `predicates`
///
/// Dimensions outside `predicates` are ignored even when set.
pub fn select<'a>(
    store: &'a RecordStore,
    snapshot: &FilterSnapshot,
    predicates: &PredicateSet,
) -> FilteredView<'a> {
    store
        .iter()
        .filter(|record| predicates.matches(record, snapshot))
        .collect()
}
