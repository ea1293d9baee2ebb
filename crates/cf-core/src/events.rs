//! Dashboard event bus
//!
//! Subscribers register for one event type and receive it by reference.
//! Delivery is synchronous, in subscription order, on the publishing thread.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use parking_lot::Mutex;
use ahash::AHashMap;

/// Anything published on the bus
pub trait Event: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Type-erased subscriber
pub trait EventHandler: Send {
    fn handle(&mut self, event: &dyn Event);
}

/// Events the dashboard publishes
pub mod events {
    use crate::filter::{FilterDimension, FilterValue};

    /// A dataset was bound to the dashboard and every chart drawn
    #[derive(Debug, Clone, PartialEq)]
    pub struct DatasetLoaded {
        pub source_name: String,
        pub row_count: usize,
    }

    /// A filter dimension was set or unset
    #[derive(Debug, Clone, PartialEq)]
    pub struct FilterChanged {
        pub dimension: FilterDimension,
        pub previous: Option<FilterValue>,
        pub current: Option<FilterValue>,
    }

    /// A chart pipeline produced a new projection
    #[derive(Debug, Clone, PartialEq)]
    pub struct ChartRecomputed {
        pub chart: String,
        pub matched_rows: usize,
        /// Dimension whose change caused the pass, `None` on load or clear
        pub trigger: Option<FilterDimension>,
    }
}

/// Calls a closure for every event of type `E`
struct TypedHandler<E, F> {
    callback: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> EventHandler for TypedHandler<E, F>
where
    E: Event,
    F: FnMut(&E) + Send,
{
    fn handle(&mut self, event: &dyn Event) {
        if let Some(event) = event.as_any().downcast_ref::<E>() {
            (self.callback)(event);
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    handlers: Mutex<AHashMap<TypeId, Vec<Box<dyn EventHandler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` for every published `E`
    pub fn subscribe<E: Event>(&self, callback: impl FnMut(&E) + Send + 'static) {
        let handler = TypedHandler {
            callback,
            _event: PhantomData,
        };
        self.handlers
            .lock()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Box::new(handler));
    }

    /// Number of subscribers for `E`
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.handlers
            .lock()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Deliver `event` to its subscribers
    ///
    /// Subscribers must not publish on the same bus.
    pub fn publish<E: Event>(&self, event: E) {
        let mut handlers = self.handlers.lock();
        if let Some(subscribers) = handlers.get_mut(&TypeId::of::<E>()) {
            for handler in subscribers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use super::*;
    use super::events::{DatasetLoaded, FilterChanged};
    use crate::filter::{FilterDimension, FilterValue};

    #[test]
    fn test_publish_reaches_matching_subscribers_only() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe(move |changed: &FilterChanged| sink.lock().push(changed.dimension));
        assert_eq!(bus.subscriber_count::<FilterChanged>(), 1);
        assert_eq!(bus.subscriber_count::<DatasetLoaded>(), 0);

        bus.publish(DatasetLoaded {
            source_name: "data.json".to_string(),
            row_count: 3,
        });
        bus.publish(FilterChanged {
            dimension: FilterDimension::Sector,
            previous: None,
            current: Some(FilterValue::from("Energy")),
        });

        assert_eq!(*seen.lock(), vec![FilterDimension::Sector]);
    }

    #[test]
    fn test_subscribers_run_in_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for id in 0..3 {
            let sink = order.clone();
            bus.subscribe(move |_: &DatasetLoaded| sink.lock().push(id));
        }
        bus.publish(DatasetLoaded {
            source_name: "demo".to_string(),
            row_count: 0,
        });

        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }
}
