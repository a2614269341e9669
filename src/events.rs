//! In-page component bus. Components that must stay unaware of each other
//! (language fan-out, map requests) talk through here; everything else uses
//! direct method calls.

use crate::api::TourData;
use dioxus::logger::tracing::trace;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum TourEvent {
    DataReady(Rc<TourData>),
    LanguageChanged { code: String, tour: Rc<TourData> },
    HighlightMarker { stop_id: String, animate: bool },
    ResetMapView,
    ReloadContent,
    AudioFilesUpdated { code: String },
}

impl TourEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DataReady(_) => "data-ready",
            Self::LanguageChanged { .. } => "language-changed",
            Self::HighlightMarker { .. } => "highlight-marker",
            Self::ResetMapView => "reset-map-view",
            Self::ReloadContent => "reload-content",
            Self::AudioFilesUpdated { .. } => "audio-files-updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&TourEvent)>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

/// Single-threaded publish/subscribe bus. Cloning shares the same listeners.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl PartialEq for EventBus {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&TourEvent) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| *existing != id);
        inner.listeners.len() != before
    }

    /// Delivers to a snapshot of the listeners, so a listener may publish or
    /// (un)subscribe without deadlocking on the borrow.
    pub fn publish(&self, event: TourEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        trace!("{} -> {} listeners", event.name(), listeners.len());
        for listener in listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fans_out_to_all_subscribers() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["audio", "footer"] {
            let seen = seen.clone();
            bus.subscribe(move |event| seen.borrow_mut().push(format!("{tag}:{}", event.name())));
        }

        bus.publish(TourEvent::ResetMapView);
        assert_eq!(
            *seen.borrow(),
            vec!["audio:reset-map-view".to_string(), "footer:reset-map-view".to_string()]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let id = bus.subscribe(move |_| counter.set(counter.get() + 1));

        bus.publish(TourEvent::ReloadContent);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(TourEvent::ReloadContent);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_may_publish_reentrantly() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let forward = bus.clone();
        bus.subscribe(move |event| {
            if let TourEvent::AudioFilesUpdated { .. } = event {
                forward.publish(TourEvent::ReloadContent);
            }
        });
        let log = seen.clone();
        bus.subscribe(move |event| log.borrow_mut().push(event.name()));

        bus.publish(TourEvent::AudioFilesUpdated { code: "en".into() });
        assert_eq!(*seen.borrow(), vec!["reload-content", "audio-files-updated"]);
    }
}
