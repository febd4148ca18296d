//! Address → view routing
//!
//! The router owns no view state of its own beyond the last derived value;
//! every location change re-derives the [`View`] from the address and
//! broadcasts one `show-view`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::service::events::{Event, EventBus};
use crate::types::{ItemId, View};

/// Derive the logical view from an address
///
/// Recognized shapes:
/// - `/` → home
/// - `/login`, `/signup`
/// - `/profile/{username}`
/// - `/hashtag/{tag}` or a `#tag` fragment
/// - `/bloom/{id}`
///
/// Anything else falls back to home.
pub fn parse_location(address: &str) -> View {
    let (path, fragment) = match address.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (address, None),
    };
    let path = path.split('?').next().unwrap_or_default();

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        ["login"] => View::Login,
        ["signup"] => View::Signup,
        ["profile", username] => View::Profile {
            username: (*username).to_string(),
        },
        ["hashtag", tag] => hashtag_view(tag),
        ["bloom", id] => match id.parse::<ItemId>() {
            Ok(id) => View::Item { id },
            Err(_) => View::Home,
        },
        [] => match fragment {
            Some(tag) => hashtag_view(tag),
            None => View::Home,
        },
        _ => View::Home,
    }
}

fn hashtag_view(tag: &str) -> View {
    let tag = tag.trim_start_matches('#');
    if tag.is_empty() {
        View::Home
    } else {
        View::Hashtag {
            hashtag: tag.to_string(),
        }
    }
}

/// Navigation history the router reads addresses from
pub trait History {
    /// Address of the current entry
    fn current(&self) -> String;

    /// Push a new entry and make it current
    fn push(&self, path: &str);

    /// Step back; returns false when already at the first entry
    fn back(&self) -> bool;

    /// Step forward; returns false when already at the last entry
    fn forward(&self) -> bool;
}

/// In-memory history stack
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
    index: Cell<usize>,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: RefCell::new(vec![initial.to_string()]),
            index: Cell::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn current(&self) -> String {
        self.entries
            .borrow()
            .get(self.index.get())
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    fn push(&self, path: &str) {
        let mut entries = self.entries.borrow_mut();
        // Pushing discards any forward entries
        entries.truncate(self.index.get() + 1);
        entries.push(path.to_string());
        self.index.set(entries.len() - 1);
    }

    fn back(&self) -> bool {
        let index = self.index.get();
        if index == 0 {
            return false;
        }
        self.index.set(index - 1);
        true
    }

    fn forward(&self) -> bool {
        let index = self.index.get();
        if index + 1 >= self.entries.borrow().len() {
            return false;
        }
        self.index.set(index + 1);
        true
    }
}

/// Router
#[derive(Clone)]
pub struct Router {
    history: Rc<dyn History>,
    bus: EventBus,
    current: Rc<RefCell<View>>,
}

impl Router {
    pub fn new(history: Rc<dyn History>, bus: EventBus) -> Self {
        let current = parse_location(&history.current());
        Self {
            history,
            bus,
            current: Rc::new(RefCell::new(current)),
        }
    }

    /// Re-derive the view from the current address and broadcast it
    pub fn on_location_change(&self) -> View {
        let address = self.history.current();
        let view = parse_location(&address);
        tracing::info!(address = %address, view = view.name(), "location changed");
        *self.current.borrow_mut() = view.clone();
        self.bus.publish(Event::ShowView { view: view.clone() });
        view
    }

    /// Push `path` onto history and broadcast the resulting view
    pub fn navigate_to(&self, path: &str) -> View {
        self.history.push(path);
        self.on_location_change()
    }

    /// Browser-style back navigation
    pub fn back(&self) -> Option<View> {
        self.history.back().then(|| self.on_location_change())
    }

    /// Browser-style forward navigation
    pub fn forward(&self) -> Option<View> {
        self.history.forward().then(|| self.on_location_change())
    }

    /// The last view broadcast (or derived at construction)
    pub fn current_view(&self) -> View {
        self.current.borrow().clone()
    }

    pub fn current_address(&self) -> String {
        self.history.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::events::EventKind;

    #[test]
    fn test_parse_static_routes() {
        assert_eq!(parse_location("/"), View::Home);
        assert_eq!(parse_location(""), View::Home);
        assert_eq!(parse_location("/login"), View::Login);
        assert_eq!(parse_location("/login/"), View::Login);
        assert_eq!(parse_location("/signup?next=/"), View::Signup);
    }

    #[test]
    fn test_parse_profile() {
        assert_eq!(
            parse_location("/profile/alice"),
            View::Profile {
                username: "alice".to_string()
            }
        );
        // Missing username falls back to home
        assert_eq!(parse_location("/profile/"), View::Home);
        assert_eq!(parse_location("/profile/alice/extra"), View::Home);
    }

    #[test]
    fn test_parse_hashtag_markers() {
        let rust = View::Hashtag {
            hashtag: "rust".to_string(),
        };
        assert_eq!(parse_location("/hashtag/rust"), rust);
        assert_eq!(parse_location("/#rust"), rust);
        assert_eq!(parse_location("/#"), View::Home);
    }

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_location("/bloom/12"), View::Item { id: ItemId(12) });
        assert_eq!(parse_location("/bloom/abc"), View::Home);
    }

    #[test]
    fn test_unknown_paths_fall_back_to_home() {
        assert_eq!(parse_location("/nowhere"), View::Home);
        assert_eq!(parse_location("/a/b/c"), View::Home);
    }

    #[test]
    fn test_memory_history_stack() {
        let history = MemoryHistory::default();
        history.push("/login");
        history.push("/signup");
        assert_eq!(history.len(), 3);

        assert!(history.back());
        assert_eq!(history.current(), "/login");
        assert!(history.forward());
        assert_eq!(history.current(), "/signup");
        assert!(!history.forward());

        history.back();
        history.back();
        assert!(!history.back());
        history.push("/profile/bob");
        assert_eq!(history.len(), 2);
        assert!(!history.forward());
    }

    #[test]
    fn test_navigate_publishes_one_show_view() {
        let bus = EventBus::new();
        let router = Router::new(Rc::new(MemoryHistory::default()), bus.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::ShowView, move |event| {
            if let Event::ShowView { view } = event {
                sink.borrow_mut().push(view.clone());
            }
        });

        router.navigate_to("/profile/alice");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name(), "profile");
        assert_eq!(seen[0].params().username.as_deref(), Some("alice"));
        assert_eq!(router.current_address(), "/profile/alice");
    }

    #[test]
    fn test_back_and_forward_rebroadcast() {
        let bus = EventBus::new();
        let router = Router::new(Rc::new(MemoryHistory::default()), bus.clone());
        router.navigate_to("/login");

        assert_eq!(router.back(), Some(View::Home));
        assert_eq!(router.current_view(), View::Home);
        assert_eq!(router.back(), None);
        assert_eq!(router.forward(), Some(View::Login));
    }
}
