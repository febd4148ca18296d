//! Event bus for cross-unit coordination
//!
//! This module provides the in-process, synchronous publish/subscribe channel
//! that keeps the State Store, the Router and every UI unit in step.
//!
//! # Delivery
//!
//! `publish` fans an event out to the handlers subscribed for its kind, in
//! registration order, and returns only after every handler has run. There is
//! no buffering: a handler subscribed after the event was published never sees
//! it. Handlers may publish further events; those nested publishes complete
//! before the outer fan-out moves on to its next handler.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use libbloom::service::events::{Event, EventBus, EventKind};
//! use libbloom::types::View;
//!
//! let bus = EventBus::new();
//! let seen = Rc::new(Cell::new(0));
//!
//! let counter = Rc::clone(&seen);
//! let handle = bus.subscribe(EventKind::ShowView, move |_| counter.set(counter.get() + 1));
//!
//! bus.publish(Event::ShowView { view: View::Home });
//! assert_eq!(seen.get(), 1);
//!
//! bus.unsubscribe(handle);
//! bus.publish(Event::ShowView { view: View::Home });
//! assert_eq!(seen.get(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::types::{Item, UserRef, View};

type Handler = Rc<dyn Fn(&Event)>;

/// Event bus for coordinating state and units
///
/// Cloning is cheap and every clone addresses the same subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

struct Subscriber {
    id: u64,
    kind: EventKind,
    handler: Handler,
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle {
    id: u64,
    kind: EventKind,
}

impl SubscriptionHandle {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler` to every future event of `kind`
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionHandle
    where
        F: Fn(&Event) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.push(Subscriber {
            id,
            kind,
            handler: Rc::new(handler),
        });
        tracing::trace!(kind = %kind, id, "subscribed");
        SubscriptionHandle { id, kind }
    }

    /// Detach a subscription
    ///
    /// Returns `false` if the handle was already unsubscribed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|s| s.id != handle.id);
        before != inner.subscribers.len()
    }

    /// Deliver `event` to its subscribers, synchronously and in order
    pub fn publish(&self, event: Event) {
        let kind = event.kind();
        // Snapshot so handlers may subscribe/unsubscribe/publish while we iterate
        let targets: Vec<(u64, Handler)> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| (s.id, Rc::clone(&s.handler)))
            .collect();

        tracing::debug!(event = %kind, subscribers = targets.len(), "publish");

        for (id, handler) in targets {
            if self.is_subscribed(id) {
                handler(&event);
            }
        }
    }

    /// Total number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Number of live subscriptions for one event kind
    pub fn subscriber_count_for(&self, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.inner.borrow().subscribers.iter().any(|s| s.id == id)
    }
}

/// Event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    StateChange,
    ShowView,
    AuthChange,
    ItemPosted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::StateChange => "state-change",
            EventKind::ShowView => "show-view",
            EventKind::AuthChange => "auth-change",
            EventKind::ItemPosted => "item-posted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events carried by the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    /// The State Store changed; carries the new full snapshot
    StateChange { state: Arc<AppState> },

    /// The Router derived a new view
    ///
    /// On the wire: `{"type": "show-view", "view": "profile", "params": {"username": ...}}`
    ShowView {
        #[serde(flatten)]
        view: View,
    },

    /// A unit reports a login or logout
    AuthChange {
        is_logged_in: bool,
        user: Option<UserRef>,
        token: Option<String>,
    },

    /// A bloom was accepted by the backend
    ItemPosted { item: Item },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::StateChange { .. } => EventKind::StateChange,
            Event::ShowView { .. } => EventKind::ShowView,
            Event::AuthChange { .. } => EventKind::AuthChange,
            Event::ItemPosted { .. } => EventKind::ItemPosted,
        }
    }

    /// `auth-change` for a successful login or signup
    pub fn logged_in(user: UserRef, token: impl Into<String>) -> Self {
        Event::AuthChange {
            is_logged_in: true,
            user: Some(user),
            token: Some(token.into()),
        }
    }

    /// `auth-change` for a logout
    pub fn logged_out() -> Self {
        Event::AuthChange {
            is_logged_in: false,
            user: None,
            token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recorder(bus: &EventBus, kind: EventKind, log: &Rc<RefCell<Vec<String>>>, tag: &str) -> SubscriptionHandle {
        let log = Rc::clone(log);
        let tag = tag.to_string();
        bus.subscribe(kind, move |event| {
            log.borrow_mut().push(format!("{}:{}", tag, event.kind()));
        })
    }

    #[test]
    fn test_fan_out_in_registration_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        recorder(&bus, EventKind::ShowView, &log, "first");
        recorder(&bus, EventKind::ShowView, &log, "second");
        recorder(&bus, EventKind::AuthChange, &log, "other");

        bus.publish(Event::ShowView { view: View::Home });

        assert_eq!(
            *log.borrow(),
            vec!["first:show-view".to_string(), "second:show-view".to_string()]
        );
    }

    #[test]
    fn test_no_replay_for_late_subscribers() {
        let bus = EventBus::new();
        bus.publish(Event::logged_out());

        let log = Rc::new(RefCell::new(Vec::new()));
        recorder(&bus, EventKind::AuthChange, &log, "late");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = recorder(&bus, EventKind::ItemPosted, &log, "a");
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(handle));
        assert!(!bus.unsubscribe(handle));
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(handle.kind(), EventKind::ItemPosted);
    }

    #[test]
    fn test_handler_removed_mid_publish_is_skipped() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let victim: Rc<Cell<Option<SubscriptionHandle>>> = Rc::new(Cell::new(None));

        let bus_clone = bus.clone();
        let victim_clone = Rc::clone(&victim);
        bus.subscribe(EventKind::ShowView, move |_| {
            if let Some(handle) = victim_clone.get() {
                bus_clone.unsubscribe(handle);
            }
        });

        let counter = Rc::clone(&calls);
        let handle = bus.subscribe(EventKind::ShowView, move |_| counter.set(counter.get() + 1));
        victim.set(Some(handle));

        bus.publish(Event::ShowView { view: View::Home });
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_nested_publish_completes_before_next_handler() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let nested_bus = bus.clone();
        let nested_log = Rc::clone(&log);
        bus.subscribe(EventKind::AuthChange, move |_| {
            nested_log.borrow_mut().push("auth-1".to_string());
            nested_bus.publish(Event::ShowView { view: View::Login });
        });
        recorder(&bus, EventKind::AuthChange, &log, "auth-2");
        recorder(&bus, EventKind::ShowView, &log, "view");

        bus.publish(Event::logged_out());

        assert_eq!(
            *log.borrow(),
            vec![
                "auth-1".to_string(),
                "view:show-view".to_string(),
                "auth-2:auth-change".to_string(),
            ]
        );
    }

    #[test]
    fn test_subscriber_count_for_kind() {
        let bus = EventBus::new();
        bus.subscribe(EventKind::StateChange, |_| {});
        bus.subscribe(EventKind::StateChange, |_| {});
        bus.subscribe(EventKind::ShowView, |_| {});
        assert_eq!(bus.subscriber_count_for(EventKind::StateChange), 2);
        assert_eq!(bus.subscriber_count_for(EventKind::ShowView), 1);
        assert_eq!(bus.subscriber_count_for(EventKind::ItemPosted), 0);
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(Event::logged_in(UserRef::new("sample"), "T")).unwrap();
        assert_eq!(json["type"], "auth-change");
        assert_eq!(json["is_logged_in"], true);
        assert_eq!(json["user"]["username"], "sample");
        assert_eq!(EventKind::ItemPosted.to_string(), "item-posted");
    }

    #[test]
    fn test_show_view_payload_is_flat() {
        let event = Event::ShowView {
            view: View::Profile {
                username: "alice".to_string(),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "show-view");
        assert_eq!(json["view"], "profile");
        assert_eq!(json["params"]["username"], "alice");

        let decoded: Event = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);

        let json = serde_json::to_value(Event::ShowView { view: View::Home }).unwrap();
        assert_eq!(json["view"], "home");
        assert!(json.get("params").is_none());
    }
}
