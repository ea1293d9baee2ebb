//! Dashboard orchestration
//!
//! The dashboard owns the filter state and the chart pipelines. Every filter
//! event is handled to completion before the next: the state is mutated,
//! snapshotted, and only the charts whose predicate set contains the changed
//! dimension are re-run against that snapshot.

use std::sync::Arc;
use parking_lot::RwLock;
use tracing::{debug, trace};

use cf_core::events::events::{ChartRecomputed, DatasetLoaded, FilterChanged};
use cf_core::events::EventBus;
use cf_core::{FilterDimension, FilterSnapshot, FilterState, FilterValue, RecordStore};
use cf_data::FilterOptions;

use crate::chart::{ChartKind, ChartSpec, Projection};
use crate::config::DashboardConfig;
use crate::emitter::ProjectionEmitter;

/// Cross-filtered set of charts over one dataset
pub struct Dashboard {
    store: Arc<RecordStore>,
    filters: Arc<RwLock<FilterState>>,
    charts: Vec<ChartSpec>,
    event_bus: Arc<EventBus>,
}

impl Dashboard {
    pub fn new(store: Arc<RecordStore>, config: &DashboardConfig) -> Self {
        Self {
            store,
            filters: Arc::new(RwLock::new(FilterState::new())),
            charts: config.chart_specs(),
            event_bus: Arc::new(EventBus::new()),
        }
    }

    /// Publish on a shared bus instead of a private one
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn charts(&self) -> &[ChartSpec] {
        &self.charts
    }

    /// Current filter state
    pub fn filters(&self) -> FilterSnapshot {
        self.filters.read().snapshot()
    }

    /// Option lists for the filter controls
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_store(&self.store)
    }

    /// Reset every filter and draw every chart once
    pub fn load(&self, source_name: &str, emitter: &mut dyn ProjectionEmitter) {
        let snapshot = {
            let mut filters = self.filters.write();
            filters.clear();
            filters.snapshot()
        };

        debug!(source = source_name, rows = self.store.len(), "Drawing dashboard");
        self.event_bus.publish(DatasetLoaded {
            source_name: source_name.to_string(),
            row_count: self.store.len(),
        });

        self.recompute(&snapshot, |_| true, None, emitter);
    }

    /// Set or unset one filter dimension
    ///
    /// Returns the charts that were recomputed, in dashboard order. Setting a
    /// dimension to the value it already holds recomputes nothing.
    pub fn set_filter(
        &self,
        dimension: FilterDimension,
        value: Option<FilterValue>,
        emitter: &mut dyn ProjectionEmitter,
    ) -> Vec<ChartKind> {
        let (previous, snapshot) = {
            let mut filters = self.filters.write();
            if filters.get(dimension) == value.as_ref() {
                trace!(%dimension, "Filter unchanged");
                return Vec::new();
            }
            let previous = filters.set(dimension, value.clone());
            (previous, filters.snapshot())
        };

        debug!(%dimension, ?previous, current = ?value, "Filter changed");
        self.event_bus.publish(FilterChanged {
            dimension,
            previous,
            current: value,
        });

        self.recompute(&snapshot, |spec| spec.reacts_to(dimension), Some(dimension), emitter)
    }

    /// Unset every active filter
    ///
    /// Each cleared dimension is announced separately; every chart reacting
    /// to any of them is recomputed once.
    pub fn clear_filters(&self, emitter: &mut dyn ProjectionEmitter) -> Vec<ChartKind> {
        let (cleared, snapshot) = {
            let mut filters = self.filters.write();
            let cleared: Vec<(FilterDimension, FilterValue)> =
                filters.active().map(|(dim, value)| (dim, value.clone())).collect();
            filters.clear();
            (cleared, filters.snapshot())
        };

        if cleared.is_empty() {
            return Vec::new();
        }

        for (dimension, previous) in &cleared {
            self.event_bus.publish(FilterChanged {
                dimension: *dimension,
                previous: Some(previous.clone()),
                current: None,
            });
        }

        self.recompute(
            &snapshot,
            |spec| cleared.iter().any(|(dim, _)| spec.reacts_to(*dim)),
            None,
            emitter,
        )
    }

    /// Run one chart under the current filters
    pub fn project(&self, kind: ChartKind) -> Option<Projection> {
        let snapshot = self.filters();
        self.charts
            .iter()
            .find(|spec| spec.kind == kind)
            .map(|spec| spec.run(&self.store, &snapshot))
    }

    /// Run every chart under one snapshot of the current filters
    pub fn project_all(&self) -> Vec<Projection> {
        let snapshot = self.filters();
        self.charts.iter().map(|spec| spec.run(&self.store, &snapshot)).collect()
    }

    fn recompute(
        &self,
        snapshot: &FilterSnapshot,
        affected: impl Fn(&ChartSpec) -> bool,
        trigger: Option<FilterDimension>,
        emitter: &mut dyn ProjectionEmitter,
    ) -> Vec<ChartKind> {
        let mut recomputed = Vec::new();

        for spec in self.charts.iter().filter(|spec| affected(spec)) {
            let projection = spec.run(&self.store, snapshot);
            debug!(chart = %spec.kind, matched = projection.matched, "Chart recomputed");

            emitter.emit(&projection);
            self.event_bus.publish(ChartRecomputed {
                chart: spec.kind.name().to_string(),
                matched_rows: projection.matched,
                trigger,
            });
            recomputed.push(spec.kind);
        }

        recomputed
    }
}
