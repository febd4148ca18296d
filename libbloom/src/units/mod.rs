//! UI units
//!
//! A unit is an independently defined piece of presentation with a lifecycle.
//! Units hold only transient local state (drafts, inline messages, pending
//! flags); everything shared lives in the State Store. Hooks never act on the
//! world directly: they return [`Command`]s that the coordinator executes.

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::config::Config;
use crate::error::{ApiFailure, LifecycleError};
use crate::presentation::{DomEvent, DomEventKind, Rendered};
use crate::service::events::Event;
use crate::state::AppState;
use crate::types::{Item, ItemId, UserRef, View};
use crate::view::DataNeed;

pub mod composer;
pub mod error_surface;
pub mod lifecycle;
pub mod login;
pub mod logout;
pub mod profile;
pub mod signup;
pub mod timeline;
pub mod who_to_follow;

pub use lifecycle::LifecycleManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitKind {
    Composer,
    Timeline,
    Profile,
    Login,
    Signup,
    Logout,
    WhoToFollow,
    ErrorSurface,
}

impl UnitKind {
    /// Every kind, in the order the standard page attaches them
    pub const ALL: [UnitKind; 8] = [
        UnitKind::ErrorSurface,
        UnitKind::Login,
        UnitKind::Signup,
        UnitKind::Logout,
        UnitKind::Profile,
        UnitKind::Composer,
        UnitKind::Timeline,
        UnitKind::WhoToFollow,
    ];

    /// Template the unit materializes from
    pub fn template(&self) -> &'static str {
        match self {
            UnitKind::Composer => "composer",
            UnitKind::Timeline => "timeline",
            UnitKind::Profile => "profile",
            UnitKind::Login => "login",
            UnitKind::Signup => "signup",
            UnitKind::Logout => "logout",
            UnitKind::WhoToFollow => "who-to-follow",
            UnitKind::ErrorSurface => "error",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(Uuid);

impl UnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Uninitialized,
    Active,
    TornDown,
}

/// An element a unit listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub target: &'static str,
    pub kind: DomEventKind,
}

impl Binding {
    pub const fn new(target: &'static str, kind: DomEventKind) -> Self {
        Self { target, kind }
    }
}

/// Login or registration credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Backend operations a unit may request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Login(Credentials),
    Register(Credentials),
    PostItem { content: String },
    Follow { username: String },
    Like { id: ItemId },
}

impl ApiCall {
    pub fn name(&self) -> &'static str {
        match self {
            ApiCall::Login(_) => "login",
            ApiCall::Register(_) => "register",
            ApiCall::PostItem { .. } => "post_item",
            ApiCall::Follow { .. } => "follow",
            ApiCall::Like { .. } => "like",
        }
    }
}

/// Result of an [`ApiCall`], delivered back to the unit that asked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Authenticated { user: UserRef, token: String },
    Posted { item: Item },
    Followed { username: String },
    Liked { id: ItemId },
    Failed(ApiFailure),
}

/// Work a unit asks the coordinator to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Publish(Event),
    Navigate(String),
    Load(DataNeed),
    Call(ApiCall),
    DismissError,
}

/// What a hook may read
pub struct UnitContext<'a> {
    pub state: &'a AppState,
    pub view: &'a View,
}

/// A lifecycle-bearing piece of presentation
///
/// Every hook has a no-op default except [`Unit::kind`] and [`Unit::render`].
pub trait Unit {
    fn kind(&self) -> UnitKind;

    /// Auth-gated units only activate while a user is logged in
    fn requires_auth(&self) -> bool {
        false
    }

    /// Whether the materialized structure survives deactivation
    fn retains_structure(&self) -> bool {
        true
    }

    fn bindings(&self) -> Vec<Binding> {
        Vec::new()
    }

    /// Called once per `Uninitialized → Active` transition
    fn on_activate(&mut self, _ctx: &UnitContext<'_>) -> Vec<Command> {
        Vec::new()
    }

    /// Called on `Active → Uninitialized`; drop transient local state here
    fn on_deactivate(&mut self) {}

    fn on_detach(&mut self) {}

    fn on_state_change(&mut self, _ctx: &UnitContext<'_>) -> Vec<Command> {
        Vec::new()
    }

    fn on_show_view(&mut self, _ctx: &UnitContext<'_>) -> Vec<Command> {
        Vec::new()
    }

    fn on_item_posted(&mut self, _item: &Item, _ctx: &UnitContext<'_>) -> Vec<Command> {
        Vec::new()
    }

    fn on_interaction(
        &mut self,
        _target: &str,
        _event: &DomEvent,
        _ctx: &UnitContext<'_>,
    ) -> Vec<Command> {
        Vec::new()
    }

    fn on_outcome(&mut self, _outcome: &Outcome, _ctx: &UnitContext<'_>) -> Vec<Command> {
        Vec::new()
    }

    /// Whether the unit has anything to show for `state`
    fn is_presentable(&self, _state: &AppState) -> bool {
        true
    }

    fn render(&self, ctx: &UnitContext<'_>) -> Rendered;
}

type Constructor = Box<dyn Fn() -> Box<dyn Unit>>;

/// Maps unit kinds to constructors
#[derive(Default)]
pub struct UnitRegistry {
    constructors: BTreeMap<UnitKind, Constructor>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in unit
    pub fn standard(config: &Config) -> Self {
        let max_chars = config.composer.max_chars;
        let mut registry = Self::new();
        registry.register(UnitKind::Composer, move || {
            Box::new(composer::Composer::new(max_chars))
        });
        registry.register(UnitKind::Timeline, || Box::new(timeline::Timeline::new()));
        registry.register(UnitKind::Profile, || Box::new(profile::ProfilePanel::new()));
        registry.register(UnitKind::Login, || Box::new(login::LoginForm::new()));
        registry.register(UnitKind::Signup, || Box::new(signup::SignupForm::new()));
        registry.register(UnitKind::Logout, || Box::new(logout::LogoutButton));
        registry.register(UnitKind::WhoToFollow, || {
            Box::new(who_to_follow::WhoToFollow::new())
        });
        registry.register(UnitKind::ErrorSurface, || {
            Box::new(error_surface::ErrorSurface)
        });
        registry
    }

    pub fn register<F>(&mut self, kind: UnitKind, constructor: F)
    where
        F: Fn() -> Box<dyn Unit> + 'static,
    {
        self.constructors.insert(kind, Box::new(constructor));
    }

    pub fn create(&self, kind: UnitKind) -> Result<Box<dyn Unit>, LifecycleError> {
        self.constructors
            .get(&kind)
            .map(|constructor| constructor())
            .ok_or_else(|| LifecycleError::UnknownUnit(kind.to_string()))
    }

    pub fn contains(&self, kind: UnitKind) -> bool {
        self.constructors.contains_key(&kind)
    }
}

/// Username to act on from a click, falling back to the viewed profile
pub(crate) fn clicked_username(event: &DomEvent, view: &View) -> Option<String> {
    match (event, view) {
        (DomEvent::Click { value: Some(value) }, _) => Some(value.clone()),
        (DomEvent::Click { value: None }, View::Profile { username }) => Some(username.clone()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::types::Session;

    pub fn logged_in_state(username: &str) -> AppState {
        AppState {
            session: Session::logged_in(UserRef::new(username), "T"),
            ..AppState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_kind() {
        let registry = UnitRegistry::standard(&Config::default_config());
        for kind in UnitKind::ALL {
            let unit = registry.create(kind).unwrap();
            assert_eq!(unit.kind(), kind);
        }
    }

    #[test]
    fn test_unknown_kind() {
        let registry = UnitRegistry::new();
        assert!(!registry.contains(UnitKind::Timeline));
        assert_eq!(
            registry.create(UnitKind::Timeline).err(),
            Some(LifecycleError::UnknownUnit("timeline".to_string()))
        );
    }

    #[test]
    fn test_auth_gating_per_kind() {
        let registry = UnitRegistry::standard(&Config::default_config());
        let gated: Vec<UnitKind> = UnitKind::ALL
            .into_iter()
            .filter(|kind| registry.create(*kind).unwrap().requires_auth())
            .collect();
        assert_eq!(
            gated,
            vec![UnitKind::Logout, UnitKind::Composer, UnitKind::WhoToFollow]
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials {
            username: "sample".to_string(),
            password: "sosecret".to_string(),
        };
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("sample"));
        assert!(!debug.contains("sosecret"));
    }

    #[test]
    fn test_clicked_username() {
        let profile = View::Profile {
            username: "bob".to_string(),
        };
        assert_eq!(
            clicked_username(&DomEvent::click(), &profile),
            Some("bob".to_string())
        );
        assert_eq!(
            clicked_username(&DomEvent::click_on("carol"), &View::Home),
            Some("carol".to_string())
        );
        assert_eq!(clicked_username(&DomEvent::click(), &View::Home), None);
    }
}
