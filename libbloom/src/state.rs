//! Application state and the State Store
//!
//! `AppState` is the single source of truth. The store hands out immutable
//! snapshots and is the only writer: every `update` or `reset` replaces the
//! snapshot and then broadcasts exactly one `state-change` on the event bus.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::service::events::{Event, EventBus};
use crate::types::{ErrorNotice, Item, ItemId, Profile, Session};

/// Root application state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Who is logged in
    pub session: Session,

    /// Profiles keyed by username, populated lazily per username
    pub profiles: BTreeMap<String, Profile>,

    /// Home timeline, newest first
    pub feed: Vec<Item>,

    /// Blooms per hashtag, newest first
    pub hashtags: BTreeMap<String, Vec<Item>>,

    /// Individually fetched blooms
    pub items: BTreeMap<ItemId, Item>,

    /// Who-to-follow suggestions for the logged-in user
    pub suggestions: Vec<String>,

    /// Message on the error surface
    pub error: Option<ErrorNotice>,
}

impl AppState {
    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn profile(&self, username: &str) -> Option<&Profile> {
        self.profiles.get(username)
    }

    /// Profile of the logged-in user, if fetched
    pub fn own_profile(&self) -> Option<&Profile> {
        self.session
            .username()
            .and_then(|username| self.profiles.get(username))
    }

    pub fn hashtag_items(&self, tag: &str) -> &[Item] {
        self.hashtags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Partial state for [`StateStore::update`]
///
/// Each `Some` field replaces the top-level key wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub session: Option<Session>,
    pub profiles: Option<BTreeMap<String, Profile>>,
    pub feed: Option<Vec<Item>>,
    pub hashtags: Option<BTreeMap<String, Vec<Item>>>,
    pub items: Option<BTreeMap<ItemId, Item>>,
    pub suggestions: Option<Vec<String>>,
    pub error: Option<Option<ErrorNotice>>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn profiles(mut self, profiles: BTreeMap<String, Profile>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn feed(mut self, feed: Vec<Item>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn hashtags(mut self, hashtags: BTreeMap<String, Vec<Item>>) -> Self {
        self.hashtags = Some(hashtags);
        self
    }

    pub fn items(mut self, items: BTreeMap<ItemId, Item>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    pub fn error(mut self, error: Option<ErrorNotice>) -> Self {
        self.error = Some(error);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, mut state: AppState) -> AppState {
        if let Some(session) = self.session {
            state.session = session;
        }
        if let Some(profiles) = self.profiles {
            state.profiles = profiles;
        }
        if let Some(feed) = self.feed {
            state.feed = feed;
        }
        if let Some(hashtags) = self.hashtags {
            state.hashtags = hashtags;
        }
        if let Some(items) = self.items {
            state.items = items;
        }
        if let Some(suggestions) = self.suggestions {
            state.suggestions = suggestions;
        }
        if let Some(error) = self.error {
            state.error = error;
        }
        state
    }
}

/// Shared, single-writer container for [`AppState`]
///
/// Clones share the same state and bus.
#[derive(Clone)]
pub struct StateStore {
    state: Rc<RefCell<Arc<AppState>>>,
    bus: EventBus,
}

impl StateStore {
    pub fn new(bus: EventBus) -> Self {
        Self {
            state: Rc::new(RefCell::new(Arc::new(AppState::default()))),
            bus,
        }
    }

    /// Immutable snapshot of the current state
    pub fn get(&self) -> Arc<AppState> {
        Arc::clone(&self.state.borrow())
    }

    /// Shallow-merge `patch` into the state and broadcast `state-change`
    pub fn update(&self, patch: StatePatch) {
        let next = {
            let current = self.state.borrow();
            Arc::new(patch.apply(AppState::clone(&current)))
        };
        self.replace(next);
    }

    /// Restore the initial empty state and broadcast `state-change`
    pub fn reset(&self) {
        self.replace(Arc::new(AppState::default()));
    }

    /// The bus this store publishes on
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn replace(&self, next: Arc<AppState>) {
        *self.state.borrow_mut() = Arc::clone(&next);
        // Borrow released above so handlers may read or update the store
        self.bus.publish(Event::StateChange { state: next });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::events::EventKind;
    use crate::types::UserRef;

    fn store_with_log() -> (StateStore, Rc<RefCell<Vec<Arc<AppState>>>>) {
        let bus = EventBus::new();
        let store = StateStore::new(bus.clone());
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        bus.subscribe(EventKind::StateChange, move |event| {
            if let Event::StateChange { state } = event {
                sink.borrow_mut().push(Arc::clone(state));
            }
        });
        (store, log)
    }

    #[test]
    fn test_initial_state_is_empty() {
        let store = StateStore::new(EventBus::new());
        let state = store.get();
        assert!(!state.is_logged_in());
        assert!(state.profiles.is_empty());
        assert!(state.feed.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_update_merges_top_level_keys() {
        let (store, _) = store_with_log();
        store.update(StatePatch::new().suggestions(vec!["bob".to_string()]));
        store.update(StatePatch::new().session(Session::logged_in(UserRef::new("amy"), "T")));

        let state = store.get();
        assert_eq!(state.suggestions, vec!["bob".to_string()]);
        assert_eq!(state.session.username(), Some("amy"));
    }

    #[test]
    fn test_update_replaces_nested_maps_wholesale() {
        let (store, _) = store_with_log();
        let mut profiles = BTreeMap::new();
        profiles.insert("alice".to_string(), Profile::new("alice"));
        store.update(StatePatch::new().profiles(profiles));

        let mut profiles = BTreeMap::new();
        profiles.insert("bob".to_string(), Profile::new("bob"));
        store.update(StatePatch::new().profiles(profiles));

        let state = store.get();
        assert!(state.profile("alice").is_none());
        assert!(state.profile("bob").is_some());
    }

    #[test]
    fn test_each_update_broadcasts_once_in_order() {
        let (store, log) = store_with_log();
        store.update(StatePatch::new().suggestions(vec!["a".to_string()]));
        store.update(StatePatch::new().suggestions(vec!["b".to_string()]));

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].suggestions, vec!["a".to_string()]);
        assert_eq!(log[1].suggestions, vec!["b".to_string()]);
    }

    #[test]
    fn test_empty_patch_still_broadcasts() {
        let (store, log) = store_with_log();
        let patch = StatePatch::new();
        assert!(patch.is_empty());
        store.update(patch);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let (store, log) = store_with_log();
        store.update(
            StatePatch::new()
                .session(Session::logged_in(UserRef::new("amy"), "T"))
                .feed(Vec::new())
                .error(Some(ErrorNotice {
                    detail: "boom".to_string(),
                    status: None,
                })),
        );
        store.reset();

        assert_eq!(*store.get(), AppState::default());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let (store, _) = store_with_log();
        let before = store.get();
        store.update(StatePatch::new().suggestions(vec!["x".to_string()]));
        assert!(before.suggestions.is_empty());
        assert_eq!(store.get().suggestions, vec!["x".to_string()]);
    }

    #[test]
    fn test_handler_may_read_store_during_broadcast() {
        let bus = EventBus::new();
        let store = StateStore::new(bus.clone());
        let reader = store.clone();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::StateChange, move |_| {
            *sink.borrow_mut() = Some(reader.get().suggestions.clone());
        });

        store.update(StatePatch::new().suggestions(vec!["z".to_string()]));
        assert_eq!(*seen.borrow(), Some(vec!["z".to_string()]));
    }
}
