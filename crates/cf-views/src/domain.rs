//! Scale domains derived from aggregates
//!
//! Numeric domains skip non-finite values and fall back to
//! [`DEFAULT_EXTENT`] when nothing finite is left, so an empty chart still
//! has drawable axes. Category domains keep first-seen order, which banded
//! axes rely on.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, CategoryHistogram, CellMatrix, Point, SizedPoint};

/// A closed numeric interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 2]")]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl From<Extent> for [f64; 2] {
    fn from(extent: Extent) -> Self {
        [extent.min, extent.max]
    }
}

/// Domain used when an aggregate has no finite value
pub const DEFAULT_EXTENT: Extent = Extent::new(0.0, 10.0);

/// How a chart turns numeric values into an axis domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericDomain {
    /// `[min, max]` of the values
    #[default]
    Extent,
    /// `[0, max]`, anchoring the axis at zero
    ///
    /// Scatter, bubble and heatmap color scales start at zero so that
    /// magnitudes stay comparable across filter changes.
    ZeroBased,
}

impl NumericDomain {
    pub fn derive(&self, values: impl IntoIterator<Item = f64>) -> Extent {
        match self {
            NumericDomain::Extent => numeric_extent(values),
            NumericDomain::ZeroBased => zero_based_extent(values),
        }
    }
}

/// `[min, max]` over the finite values, [`DEFAULT_EXTENT`] when there are none
pub fn numeric_extent(values: impl IntoIterator<Item = f64>) -> Extent {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<Extent>, v| match acc {
            None => Some(Extent::new(v, v)),
            Some(extent) => Some(Extent::new(extent.min.min(v), extent.max.max(v))),
        })
        .unwrap_or(DEFAULT_EXTENT)
}

/// `[0, max]` over the finite values
///
/// A missing or zero maximum falls back to `[0, 10]`.
pub fn zero_based_extent(values: impl IntoIterator<Item = f64>) -> Extent {
    let max = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    match max {
        Some(max) if max != 0.0 => Extent::new(0.0, max),
        _ => DEFAULT_EXTENT,
    }
}

/// Distinct categories in first-seen order, missing included as `None`
pub fn distinct_categories<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Vec<Option<String>> {
    let set: IndexSet<Option<&str>> = values.into_iter().collect();
    set.into_iter().map(|v| v.map(str::to_string)).collect()
}

/// Domains handed to the renderer alongside an aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedDomain {
    /// Ordinal color domain
    Categorical { categories: Vec<Option<String>> },
    /// Two continuous axes
    Cartesian { x: Extent, y: Extent },
    /// Two continuous axes and a size channel
    Sized { x: Extent, y: Extent, size: Extent },
    /// Two banded axes and a color channel
    Banded {
        x: Vec<Option<String>>,
        y: Vec<Option<String>>,
        color: Extent,
    },
}

/// Derive the domain for an aggregate
pub fn derive_domain(aggregate: &Aggregate, numeric: NumericDomain) -> DerivedDomain {
    match aggregate {
        Aggregate::Histogram(histogram) => histogram_domain(histogram),
        Aggregate::TimeSeries(points) | Aggregate::Points(points) => point_domain(points, numeric),
        Aggregate::SizedPoints(points) => sized_point_domain(points, numeric),
        Aggregate::Matrix(matrix) => matrix_domain(matrix, numeric),
    }
}

fn histogram_domain(histogram: &CategoryHistogram) -> DerivedDomain {
    DerivedDomain::Categorical {
        categories: distinct_categories(histogram.iter().map(|(category, _)| category)),
    }
}

fn point_domain(points: &[Point], numeric: NumericDomain) -> DerivedDomain {
    DerivedDomain::Cartesian {
        x: numeric.derive(points.iter().map(|p| p.x)),
        y: numeric.derive(points.iter().map(|p| p.y)),
    }
}

fn sized_point_domain(points: &[SizedPoint], numeric: NumericDomain) -> DerivedDomain {
    DerivedDomain::Sized {
        x: numeric.derive(points.iter().map(|p| p.x)),
        y: numeric.derive(points.iter().map(|p| p.y)),
        size: numeric.derive(points.iter().map(|p| p.size)),
    }
}

fn matrix_domain(matrix: &CellMatrix, numeric: NumericDomain) -> DerivedDomain {
    DerivedDomain::Banded {
        x: distinct_categories(matrix.iter().map(|(x, _, _)| x)),
        y: distinct_categories(matrix.iter().map(|(_, y, _)| y)),
        color: numeric.derive(matrix.iter().map(|(_, _, value)| value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_of_values() {
        assert_eq!(numeric_extent([3.0, -1.0, 7.5]), Extent::new(-1.0, 7.5));
        assert_eq!(numeric_extent([4.0]), Extent::new(4.0, 4.0));
    }

    #[test]
    fn test_extent_defaults_when_empty() {
        assert_eq!(numeric_extent(std::iter::empty()), DEFAULT_EXTENT);
        assert_eq!(numeric_extent([f64::NAN, f64::INFINITY]), DEFAULT_EXTENT);
        assert_eq!(zero_based_extent(std::iter::empty()), DEFAULT_EXTENT);
    }

    #[test]
    fn test_extent_skips_nan() {
        assert_eq!(numeric_extent([f64::NAN, 2.0, 5.0]), Extent::new(2.0, 5.0));
        assert_eq!(zero_based_extent([f64::NAN, 2.0]), Extent::new(0.0, 2.0));
    }

    #[test]
    fn test_zero_based_falls_back_on_zero_max() {
        assert_eq!(zero_based_extent([0.0, 0.0]), DEFAULT_EXTENT);
        assert_eq!(zero_based_extent([1.0, 12.0]), Extent::new(0.0, 12.0));
    }

    #[test]
    fn test_categories_keep_first_seen_order() {
        let categories = distinct_categories([Some("b"), Some("a"), None, Some("b"), Some("c"), None]);
        assert_eq!(
            categories,
            vec![Some("b".to_string()), Some("a".to_string()), None, Some("c".to_string())]
        );
        assert!(distinct_categories(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_domain_is_deterministic() {
        let points = vec![Point { x: 1.0, y: 9.0 }, Point { x: 4.0, y: 2.0 }];
        let aggregate = Aggregate::Points(points);

        let first = derive_domain(&aggregate, NumericDomain::ZeroBased);
        let second = derive_domain(&aggregate, NumericDomain::ZeroBased);
        assert_eq!(first, second);
        assert_eq!(
            first,
            DerivedDomain::Cartesian {
                x: Extent::new(0.0, 4.0),
                y: Extent::new(0.0, 9.0),
            }
        );
    }

    #[test]
    fn test_extent_serializes_as_pair() {
        let json = serde_json::to_string(&DEFAULT_EXTENT).unwrap();
        assert_eq!(json, "[0.0,10.0]");
    }
}
