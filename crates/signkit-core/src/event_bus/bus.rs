//! Process-wide publish/subscribe hub.
//!
//! Synchronous handlers run on the publishing thread; tokio tasks can poll a
//! broadcast receiver instead. The last few events are kept for late
//! subscribers such as a status line that attaches after the draft loaded.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::OnceLock;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let short = self.0.simple().to_string();
        write!(f, "sub-{}", &short[..8])
    }
}

/// Which events a subscriber wants to see.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    Categories(Vec<EventCategory>),
    /// Only events that name this document id.
    Document(String),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
            EventFilter::Document(id) => event.document_id() == Some(id.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Broadcast buffer; slow receivers past this lag and skip events.
    pub channel_capacity: usize,
    /// Events kept for [`EventBus::recent`]; zero disables the backlog.
    pub backlog: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 128,
            backlog: 32,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    #[error("No active subscribers")]
    NoSubscribers,
}

struct Subscriber {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Box<dyn Fn(&AppEvent) + Send + Sync>,
}

pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    subscribers: RwLock<Vec<Subscriber>>,
    backlog: Mutex<VecDeque<AppEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            subscribers: RwLock::new(Vec::new()),
            backlog: Mutex::new(VecDeque::with_capacity(config.backlog)),
            config,
        }
    }

    /// Delivers `event` to matching handlers and to every async receiver.
    ///
    /// Returns the number of deliveries. Publishing with nobody listening is
    /// reported as [`EventBusError::NoSubscribers`]; side-effect publishers
    /// discard it with `.ok()`.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        tracing::trace!("event: {}", event.description());
        self.remember(&event);

        let mut delivered = 0;
        for subscriber in self.subscribers.read().iter() {
            if subscriber.filter.matches(&event) {
                (subscriber.handler)(&event);
                delivered += 1;
            }
        }

        let received = self.sender.send(event).unwrap_or(0);
        if delivered + received == 0 && self.subscriber_count() == 0 {
            return Err(EventBusError::NoSubscribers);
        }
        Ok(delivered + received)
    }

    /// Registers a handler; it must return quickly since it runs inline.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.write().push(Subscriber {
            id,
            filter,
            handler: Box::new(handler),
        });
        tracing::debug!("{} subscribed", id);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        before != subscribers.len()
    }

    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len() + self.sender.receiver_count()
    }

    /// Backlogged events matching `filter`, oldest first.
    pub fn recent(&self, filter: &EventFilter) -> Vec<AppEvent> {
        self.backlog
            .lock()
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect()
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn remember(&self, event: &AppEvent) {
        if self.config.backlog == 0 {
            return;
        }
        let mut backlog = self.backlog.lock();
        if backlog.len() == self.config.backlog {
            backlog.pop_front();
        }
        backlog.push_back(event.clone());
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

static EVENT_BUS: OnceLock<EventBus> = OnceLock::new();

/// The process-wide bus, created on first use.
pub fn event_bus() -> &'static EventBus {
    EVENT_BUS.get_or_init(EventBus::new)
}

/// Installs a configured global bus; fails once [`event_bus`] has run.
pub fn init_event_bus(config: EventBusConfig) -> Result<(), EventBusConfig> {
    EVENT_BUS
        .set(EventBus::with_config(config))
        .map_err(|bus| bus.config.clone())
}

/// Publish on the global bus.
#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::event_bus::event_bus().publish($event)
    };
}

/// Subscribe on the global bus.
#[macro_export]
macro_rules! on_event {
    ($filter:expr, $handler:expr) => {
        $crate::event_bus::event_bus().subscribe($filter, $handler)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{DraftEvent, EditorEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn saved(doc: &str) -> AppEvent {
        AppEvent::Draft(DraftEvent::Saved {
            document_id: doc.to_string(),
            text_fields: 1,
            signatures: 0,
        })
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert!(matches!(
            bus.publish(saved("1")),
            Err(EventBusError::NoSubscribers)
        ));
    }

    #[test]
    fn test_category_filter() {
        let bus = EventBus::new();
        let drafts = Arc::new(AtomicUsize::new(0));
        let counter = drafts.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Draft]),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.publish(saved("1")).ok();
        let editor = bus.publish(AppEvent::Editor(EditorEvent::SelectionCleared));

        assert_eq!(drafts.load(Ordering::SeqCst), 1);
        assert_eq!(editor.unwrap(), 0);
    }

    #[test]
    fn test_document_filter() {
        let filter = EventFilter::Document("7".to_string());
        assert!(filter.matches(&saved("7")));
        assert!(!filter.matches(&saved("8")));
        assert!(!filter.matches(&AppEvent::Editor(EditorEvent::SelectionCleared)));
    }

    #[test]
    fn test_backlog_is_bounded() {
        let bus = EventBus::with_config(EventBusConfig {
            backlog: 3,
            ..Default::default()
        });
        for i in 0..10 {
            bus.publish(saved(&i.to_string())).ok();
        }

        let recent = bus.recent(&EventFilter::All);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].document_id(), Some("7"));
        assert_eq!(bus.recent(&EventFilter::Document("9".to_string())).len(), 1);
    }

    #[test]
    fn test_backlog_disabled() {
        let bus = EventBus::with_config(EventBusConfig {
            backlog: 0,
            ..Default::default()
        });
        bus.publish(saved("1")).ok();
        assert!(bus.recent(&EventFilter::All).is_empty());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        assert_eq!(bus.publish(saved("42")).unwrap(), 1);

        match receiver.recv().await {
            Ok(AppEvent::Draft(DraftEvent::Saved { document_id, .. })) => {
                assert_eq!(document_id, "42")
            }
            other => panic!("Wrong event received: {:?}", other),
        }
    }
}
