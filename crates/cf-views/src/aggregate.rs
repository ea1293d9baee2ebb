//! Aggregators: reduce a filtered view to the shape one chart draws
//!
//! All reductions are pure. Missing categories form their own `None` group
//! and non-numeric measures flow through as `NaN`; neither is dropped here.

use indexmap::IndexMap;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use cf_core::{CategoryField, MeasureField, YearField};
use crate::selector::FilteredView;

/// Count of records per category, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryHistogram {
    counts: IndexMap<Option<String>, usize>,
}

impl CategoryHistogram {
    /// Count for one category; `None` asks for the missing bucket
    pub fn get(&self, category: Option<&str>) -> usize {
        let key = category.map(str::to_string);
        self.counts.get(&key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, usize)> + '_ {
        self.counts.iter().map(|(key, count)| (key.as_deref(), *count))
    }
}

impl Serialize for CategoryHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Slice<'a> {
            category: Option<&'a str>,
            count: usize,
        }

        let mut seq = serializer.serialize_seq(Some(self.counts.len()))?;
        for (category, count) in self.iter() {
            seq.serialize_element(&Slice { category, count })?;
        }
        seq.end()
    }
}

/// A plotted coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A plotted coordinate pair with a size channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizedPoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

/// How records sharing a matrix cell are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellPolicy {
    /// The last record in view order owns the cell
    #[default]
    LastWrite,
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

/// One value per `(x, y)` category pair, in first-seen order of the pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellMatrix {
    cells: IndexMap<(Option<String>, Option<String>), f64>,
}

impl CellMatrix {
    pub fn get(&self, x: Option<&str>, y: Option<&str>) -> Option<f64> {
        let key = (x.map(str::to_string), y.map(str::to_string));
        self.cells.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, Option<&str>, f64)> + '_ {
        self.cells
            .iter()
            .map(|((x, y), value)| (x.as_deref(), y.as_deref(), *value))
    }
}

impl Serialize for CellMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Cell<'a> {
            x: Option<&'a str>,
            y: Option<&'a str>,
            value: f64,
        }

        let mut seq = serializer.serialize_seq(Some(self.cells.len()))?;
        for (x, y, value) in self.iter() {
            seq.serialize_element(&Cell { x, y, value })?;
        }
        seq.end()
    }
}

/// Every aggregate shape a chart can draw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum Aggregate {
    Histogram(CategoryHistogram),
    TimeSeries(Vec<Point>),
    Points(Vec<Point>),
    SizedPoints(Vec<SizedPoint>),
    Matrix(CellMatrix),
}

impl Aggregate {
    /// Number of marks the aggregate produces
    pub fn len(&self) -> usize {
        match self {
            Aggregate::Histogram(histogram) => histogram.len(),
            Aggregate::TimeSeries(points) | Aggregate::Points(points) => points.len(),
            Aggregate::SizedPoints(points) => points.len(),
            Aggregate::Matrix(matrix) => matrix.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Count records per value of `field`
pub fn category_histogram(view: &FilteredView<'_>, field: CategoryField) -> CategoryHistogram {
    let mut counts = IndexMap::new();
    for record in view.iter() {
        let key = record.category(field).map(str::to_string);
        *counts.entry(key).or_insert(0) += 1;
    }
    CategoryHistogram { counts }
}

/// `(year, measure)` pairs in view order, unsorted and not deduplicated
pub fn time_series(view: &FilteredView<'_>, x: YearField, y: MeasureField) -> Vec<Point> {
    view.iter()
        .map(|record| Point {
            x: record.year_value(x),
            y: record.measure(y),
        })
        .collect()
}

/// One `(x, y)` pair per record
pub fn point_set(view: &FilteredView<'_>, x: MeasureField, y: MeasureField) -> Vec<Point> {
    view.iter()
        .map(|record| Point {
            x: record.measure(x),
            y: record.measure(y),
        })
        .collect()
}

/// One `(x, y, size)` triple per record
pub fn sized_point_set(
    view: &FilteredView<'_>,
    x: MeasureField,
    y: MeasureField,
    size: MeasureField,
) -> Vec<SizedPoint> {
    view.iter()
        .map(|record| SizedPoint {
            x: record.measure(x),
            y: record.measure(y),
            size: record.measure(size),
        })
        .collect()
}

/// Running totals for one matrix cell
#[derive(Debug, Clone, Copy)]
struct CellAccumulator {
    last: f64,
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl CellAccumulator {
    fn new(value: f64) -> Self {
        Self {
            last: value,
            sum: value,
            count: 1,
            min: value,
            max: value,
        }
    }

    fn push(&mut self, value: f64) {
        self.last = value;
        self.sum += value;
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn finish(&self, policy: CellPolicy) -> f64 {
        match policy {
            CellPolicy::LastWrite => self.last,
            CellPolicy::Sum => self.sum,
            CellPolicy::Mean => self.sum / self.count as f64,
            CellPolicy::Count => self.count as f64,
            CellPolicy::Min => self.min,
            CellPolicy::Max => self.max,
        }
    }
}

/// Map each `(x, y)` category pair to a measure
pub fn cell_matrix(
    view: &FilteredView<'_>,
    x: CategoryField,
    y: CategoryField,
    value: MeasureField,
    policy: CellPolicy,
) -> CellMatrix {
    let mut accumulators: IndexMap<(Option<String>, Option<String>), CellAccumulator> = IndexMap::new();

    for record in view.iter() {
        let key = (
            record.category(x).map(str::to_string),
            record.category(y).map(str::to_string),
        );
        let measure = record.measure(value);
        accumulators
            .entry(key)
            .and_modify(|cell| cell.push(measure))
            .or_insert_with(|| CellAccumulator::new(measure));
    }

    CellMatrix {
        cells: accumulators
            .into_iter()
            .map(|(key, cell)| (key, cell.finish(policy)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::{Record, RecordStore};

    fn row(sector: Option<&str>, year: Option<i64>, intensity: f64) -> Record {
        let mut record = Record::default().with_measure(MeasureField::Intensity, intensity);
        record.sector = sector.map(str::to_string);
        record.end_year = year;
        record
    }

    fn cell(region: &str, country: &str, intensity: f64) -> Record {
        Record::default()
            .with_category(CategoryField::Region, region)
            .with_category(CategoryField::Country, country)
            .with_measure(MeasureField::Intensity, intensity)
    }

    fn view(store: &RecordStore) -> FilteredView<'_> {
        store.iter().collect()
    }

    #[test]
    fn test_histogram_counts_by_sector() {
        let store: RecordStore = vec![
            row(Some("Energy"), Some(2020), 5.0),
            row(Some("Energy"), Some(2021), 7.0),
            row(Some("Retail"), Some(2020), 2.0),
        ]
        .into_iter()
        .collect();

        let histogram = category_histogram(&view(&store), CategoryField::Sector);
        assert_eq!(histogram.get(Some("Energy")), 2);
        assert_eq!(histogram.get(Some("Retail")), 1);
        assert_eq!(histogram.len(), 2);
        assert_eq!(histogram.total(), 3);

        let order: Vec<_> = histogram.iter().map(|(category, _)| category).collect();
        assert_eq!(order, vec![Some("Energy"), Some("Retail")]);
    }

    #[test]
    fn test_histogram_keeps_missing_bucket() {
        let store: RecordStore = vec![
            row(None, None, 1.0),
            row(Some("Energy"), None, 1.0),
            row(None, None, 1.0),
        ]
        .into_iter()
        .collect();

        let histogram = category_histogram(&view(&store), CategoryField::Sector);
        assert_eq!(histogram.get(None), 2);
        assert_eq!(histogram.total(), 3);
    }

    #[test]
    fn test_time_series_preserves_view_order() {
        let store: RecordStore = vec![
            row(None, Some(2025), 1.0),
            row(None, Some(2018), 2.0),
            row(None, Some(2025), 3.0),
        ]
        .into_iter()
        .collect();

        let series = time_series(&view(&store), YearField::EndYear, MeasureField::Intensity);
        let years: Vec<_> = series.iter().map(|p| p.x).collect();
        assert_eq!(years, vec![2025.0, 2018.0, 2025.0]);
        assert_eq!(series[2].y, 3.0);
    }

    #[test]
    fn test_missing_values_propagate_as_nan() {
        let store: RecordStore = vec![Record::default().with_measure(MeasureField::Relevance, 4.0)]
            .into_iter()
            .collect();
        let view = view(&store);

        let series = time_series(&view, YearField::EndYear, MeasureField::Intensity);
        assert!(series[0].x.is_nan() && series[0].y.is_nan());

        let points = sized_point_set(&view, MeasureField::Intensity, MeasureField::Relevance, MeasureField::Impact);
        assert_eq!(points.len(), 1);
        assert!(points[0].x.is_nan());
        assert_eq!(points[0].y, 4.0);
        assert!(points[0].size.is_nan());
    }

    #[test]
    fn test_point_set_projects_each_record() {
        let store: RecordStore = vec![
            Record::default()
                .with_measure(MeasureField::Intensity, 6.0)
                .with_measure(MeasureField::Relevance, 2.0),
            Record::default()
                .with_measure(MeasureField::Intensity, 1.0)
                .with_measure(MeasureField::Relevance, 3.0),
        ]
        .into_iter()
        .collect();

        let points = point_set(&view(&store), MeasureField::Intensity, MeasureField::Relevance);
        assert_eq!(points, vec![Point { x: 6.0, y: 2.0 }, Point { x: 1.0, y: 3.0 }]);
    }

    #[test]
    fn test_matrix_last_write_wins() {
        let store: RecordStore = vec![
            cell("Asia", "India", 3.0),
            cell("Europe", "France", 4.0),
            cell("Asia", "India", 8.0),
        ]
        .into_iter()
        .collect();

        let matrix = cell_matrix(
            &view(&store),
            CategoryField::Region,
            CategoryField::Country,
            MeasureField::Intensity,
            CellPolicy::LastWrite,
        );
        assert_eq!(matrix.get(Some("Asia"), Some("India")), Some(8.0));
        assert_eq!(matrix.len(), 2);

        let first: Vec<_> = matrix.iter().map(|(x, _, _)| x).collect();
        assert_eq!(first, vec![Some("Asia"), Some("Europe")]);
    }

    #[test]
    fn test_matrix_alternative_policies() {
        let store: RecordStore = vec![cell("Asia", "India", 3.0), cell("Asia", "India", 8.0)]
            .into_iter()
            .collect();
        let view = view(&store);

        let value = |policy| {
            cell_matrix(&view, CategoryField::Region, CategoryField::Country, MeasureField::Intensity, policy)
                .get(Some("Asia"), Some("India"))
        };
        assert_eq!(value(CellPolicy::Sum), Some(11.0));
        assert_eq!(value(CellPolicy::Mean), Some(5.5));
        assert_eq!(value(CellPolicy::Count), Some(2.0));
        assert_eq!(value(CellPolicy::Min), Some(3.0));
        assert_eq!(value(CellPolicy::Max), Some(8.0));
    }

    #[test]
    fn test_empty_view_yields_empty_shapes() {
        let store = RecordStore::default();
        let view = view(&store);

        assert!(category_histogram(&view, CategoryField::Sector).is_empty());
        assert!(time_series(&view, YearField::EndYear, MeasureField::Intensity).is_empty());
        assert!(point_set(&view, MeasureField::Intensity, MeasureField::Relevance).is_empty());
        assert!(cell_matrix(
            &view,
            CategoryField::Region,
            CategoryField::Country,
            MeasureField::Intensity,
            CellPolicy::default()
        )
        .is_empty());
    }

    #[test]
    fn test_histogram_serializes_as_slices() {
        let store: RecordStore = vec![row(Some("Energy"), None, 1.0), row(None, None, 1.0)]
            .into_iter()
            .collect();
        let aggregate = Aggregate::Histogram(category_histogram(&view(&store), CategoryField::Sector));

        let json = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "shape": "histogram",
                "data": [
                    {"category": "Energy", "count": 1},
                    {"category": null, "count": 1}
                ]
            })
        );
    }
}
