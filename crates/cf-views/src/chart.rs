//! Chart pipeline: selection, reduction and domain derivation
//!
//! Every chart runs the same pipeline. What differs between charts is data:
//! the predicate set it reacts to, the [`Reduction`] it applies and how its
//! numeric axes are derived.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cf_core::{
    CategoryField, FilterDimension, FilterSnapshot, MeasureField, PredicateSet, RecordStore, YearField,
};

use crate::aggregate::{self, Aggregate, CellPolicy};
use crate::domain::{derive_domain, DerivedDomain, NumericDomain};
use crate::selector::{select, FilteredView};

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown chart: {0}")]
pub struct UnknownChart(pub String);

/// The dashboard's charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Distribution by sector
    SectorPie,
    /// Intensity over time
    IntensityLine,
    /// Intensity vs relevance
    IntensityScatter,
    /// Impact vs intensity and relevance
    ImpactBubble,
    /// Intensity by region and country
    RegionHeatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::SectorPie,
        ChartKind::IntensityLine,
        ChartKind::IntensityScatter,
        ChartKind::ImpactBubble,
        ChartKind::RegionHeatmap,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::SectorPie => "sector_pie",
            ChartKind::IntensityLine => "intensity_line",
            ChartKind::IntensityScatter => "intensity_scatter",
            ChartKind::ImpactBubble => "impact_bubble",
            ChartKind::RegionHeatmap => "region_heatmap",
        }
    }

    /// Human readable title
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::SectorPie => "Distribution by Sector",
            ChartKind::IntensityLine => "Intensity over Time",
            ChartKind::IntensityScatter => "Intensity vs Relevance",
            ChartKind::ImpactBubble => "Impact vs Intensity & Relevance",
            ChartKind::RegionHeatmap => "Heatmap of Intensity by Region and Country",
        }
    }

    /// Filter dimensions the chart reacts to by default
    pub fn default_predicates(&self) -> PredicateSet {
        use FilterDimension::*;
        match self {
            ChartKind::SectorPie => PredicateSet::new([Year, Country, Region, Topic, Sector]),
            ChartKind::IntensityLine => PredicateSet::new([Country]),
            ChartKind::IntensityScatter | ChartKind::ImpactBubble | ChartKind::RegionHeatmap => {
                PredicateSet::new([Sector, Country, Region])
            }
        }
    }

    /// The pipeline this chart runs by default
    pub fn default_spec(&self) -> ChartSpec {
        let (reduction, numeric_domain) = match self {
            ChartKind::SectorPie => (
                Reduction::Histogram {
                    field: CategoryField::Sector,
                },
                NumericDomain::Extent,
            ),
            ChartKind::IntensityLine => (
                Reduction::TimeSeries {
                    x: YearField::EndYear,
                    y: MeasureField::Intensity,
                },
                NumericDomain::Extent,
            ),
            ChartKind::IntensityScatter => (
                Reduction::Points {
                    x: MeasureField::Intensity,
                    y: MeasureField::Relevance,
                },
                NumericDomain::ZeroBased,
            ),
            ChartKind::ImpactBubble => (
                Reduction::SizedPoints {
                    x: MeasureField::Intensity,
                    y: MeasureField::Relevance,
                    size: MeasureField::Impact,
                },
                NumericDomain::ZeroBased,
            ),
            ChartKind::RegionHeatmap => (
                Reduction::Matrix {
                    x: CategoryField::Region,
                    y: CategoryField::Country,
                    value: MeasureField::Intensity,
                    policy: CellPolicy::LastWrite,
                },
                NumericDomain::ZeroBased,
            ),
        };

        ChartSpec {
            kind: *self,
            predicates: self.default_predicates(),
            reduction,
            numeric_domain,
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = UnknownChart;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownChart(s.to_string()))
    }
}

/// How a filtered view is reduced to an aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reduction {
    Histogram {
        field: CategoryField,
    },
    TimeSeries {
        x: YearField,
        y: MeasureField,
    },
    Points {
        x: MeasureField,
        y: MeasureField,
    },
    SizedPoints {
        x: MeasureField,
        y: MeasureField,
        size: MeasureField,
    },
    Matrix {
        x: CategoryField,
        y: CategoryField,
        value: MeasureField,
        policy: CellPolicy,
    },
}

impl Reduction {
    pub fn reduce(&self, view: &FilteredView<'_>) -> Aggregate {
        match *self {
            Reduction::Histogram { field } => Aggregate::Histogram(aggregate::category_histogram(view, field)),
            Reduction::TimeSeries { x, y } => Aggregate::TimeSeries(aggregate::time_series(view, x, y)),
            Reduction::Points { x, y } => Aggregate::Points(aggregate::point_set(view, x, y)),
            Reduction::SizedPoints { x, y, size } => {
                Aggregate::SizedPoints(aggregate::sized_point_set(view, x, y, size))
            }
            Reduction::Matrix { x, y, value, policy } => {
                Aggregate::Matrix(aggregate::cell_matrix(view, x, y, value, policy))
            }
        }
    }
}

/// One chart's complete pipeline definition
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub predicates: PredicateSet,
    pub reduction: Reduction,
    pub numeric_domain: NumericDomain,
}

impl ChartSpec {
    /// Whether a change to `dimension` affects this chart
    pub fn reacts_to(&self, dimension: FilterDimension) -> bool {
        self.predicates.contains(dimension)
    }

    /// Run selection, reduction and domain derivation
    pub fn run(&self, store: &RecordStore, snapshot: &FilterSnapshot) -> Projection {
        let view = select(store, snapshot, &self.predicates);
        let aggregate = self.reduction.reduce(&view);
        let domain = derive_domain(&aggregate, self.numeric_domain);

        Projection {
            chart: self.kind,
            matched: view.len(),
            aggregate,
            domain,
        }
    }
}

/// Everything the renderer needs to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub chart: ChartKind,
    /// Records that passed the chart's filters
    pub matched: usize,
    pub aggregate: Aggregate,
    pub domain: DerivedDomain,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::{FilterState, FilterValue, Record};
    use crate::domain::DEFAULT_EXTENT;

    fn record(sector: &str, year: i64, intensity: f64) -> Record {
        Record::default()
            .with_category(CategoryField::Sector, sector)
            .with_year(YearField::EndYear, year)
            .with_measure(MeasureField::Intensity, intensity)
    }

    fn store() -> RecordStore {
        vec![
            record("Energy", 2020, 5.0),
            record("Energy", 2021, 7.0),
            record("Retail", 2020, 2.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_chart_names_round_trip() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.name().parse::<ChartKind>(), Ok(kind));
        }
        assert_eq!("region-heatmap".parse::<ChartKind>(), Ok(ChartKind::RegionHeatmap));
        assert!("radar".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_pie_counts_sectors() {
        let projection = ChartKind::SectorPie.default_spec().run(&store(), &FilterState::new().snapshot());

        match &projection.aggregate {
            Aggregate::Histogram(histogram) => {
                assert_eq!(histogram.get(Some("Energy")), 2);
                assert_eq!(histogram.get(Some("Retail")), 1);
            }
            other => panic!("unexpected aggregate: {:?}", other),
        }
        assert_eq!(
            projection.domain,
            DerivedDomain::Categorical {
                categories: vec![Some("Energy".to_string()), Some("Retail".to_string())],
            }
        );
    }

    #[test]
    fn test_line_ignores_sector_filter() {
        let store = store();
        let mut state = FilterState::new();
        state.set(FilterDimension::Sector, Some(FilterValue::from("Energy")));
        let snapshot = state.snapshot();

        let line = ChartKind::IntensityLine.default_spec();
        assert!(!line.reacts_to(FilterDimension::Sector));
        let projection = line.run(&store, &snapshot);
        assert_eq!(projection.aggregate.len(), 3);
        assert_eq!(
            projection.domain,
            DerivedDomain::Cartesian {
                x: crate::domain::Extent::new(2020.0, 2021.0),
                y: crate::domain::Extent::new(2.0, 7.0),
            }
        );

        let pie = ChartKind::SectorPie.default_spec().run(&store, &snapshot);
        match pie.aggregate {
            Aggregate::Histogram(histogram) => {
                assert_eq!(histogram.len(), 1);
                assert_eq!(histogram.get(Some("Energy")), 2);
            }
            other => panic!("unexpected aggregate: {:?}", other),
        }
    }

    #[test]
    fn test_empty_store_projects_default_domains() {
        let store = RecordStore::default();
        let snapshot = FilterState::new().snapshot();

        for kind in ChartKind::ALL {
            let projection = kind.default_spec().run(&store, &snapshot);
            assert!(projection.aggregate.is_empty(), "{} not empty", kind);
            assert_eq!(projection.matched, 0);

            match projection.domain {
                DerivedDomain::Categorical { categories } => assert!(categories.is_empty()),
                DerivedDomain::Cartesian { x, y } => {
                    assert_eq!(x, DEFAULT_EXTENT);
                    assert_eq!(y, DEFAULT_EXTENT);
                }
                DerivedDomain::Sized { x, y, size } => {
                    assert_eq!([x, y, size], [DEFAULT_EXTENT; 3]);
                }
                DerivedDomain::Banded { x, y, color } => {
                    assert!(x.is_empty() && y.is_empty());
                    assert_eq!(color, DEFAULT_EXTENT);
                }
            }
        }
    }

    #[test]
    fn test_reduction_config_shape() {
        let reduction: Reduction = serde_json::from_str(
            r#"{"type": "matrix", "x": "region", "y": "country", "value": "intensity", "policy": "sum"}"#,
        )
        .unwrap();
        assert_eq!(
            reduction,
            Reduction::Matrix {
                x: CategoryField::Region,
                y: CategoryField::Country,
                value: MeasureField::Intensity,
                policy: CellPolicy::Sum,
            }
        );
    }
}
