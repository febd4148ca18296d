//! Application coordinator
//!
//! Owns the wiring between the State Store, Event Bus, Router, Loader and the
//! lifecycle manager, and executes the [`Command`]s units return.
//!
//! Three bootstrap handlers are registered on construction:
//!
//! - `auth-change`: persists or clears the session, then updates or resets
//!   the store
//! - `show-view`: queues the data the composed layout needs
//! - `state-change`: on a logout → login flip, queues the current view's
//!   needs again (they were skipped while logged out)
//!
//! Nothing touches the backend until [`App::settle`] drains the queue.

use std::cell::Cell;
use std::rc::Rc;

use chrono::Utc;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};

use crate::api::{ApiResult, Backend};
use crate::config::Config;
use crate::error::{ApiError, LifecycleError};
use crate::presentation::{DomEvent, Presenter};
use crate::router::{History, Router};
use crate::service::events::{Event, EventBus, EventKind, SubscriptionHandle};
use crate::service::loader::Loader;
use crate::service::session::{
    clear_session, persist_session, restore_session, PersistedSession, SessionStorage,
};
use crate::state::{StatePatch, StateStore};
use crate::types::{ErrorNotice, Item, ItemId, Session, UserRef, View};
use crate::units::lifecycle::CommandQueue;
use crate::units::{ApiCall, Command, LifecycleManager, Outcome, UnitId, UnitKind, UnitRegistry};
use crate::view::{compose, DataNeed};

pub struct App {
    config: Config,
    backend: Rc<dyn Backend>,
    storage: Rc<dyn SessionStorage>,
    bus: EventBus,
    store: StateStore,
    router: Router,
    loader: Loader,
    queue: CommandQueue,
    manager: LifecycleManager,
    subscriptions: Vec<SubscriptionHandle>,
}

impl App {
    pub fn new(
        config: Config,
        backend: Rc<dyn Backend>,
        storage: Rc<dyn SessionStorage>,
        presenter: Rc<dyn Presenter>,
        history: Rc<dyn History>,
    ) -> Self {
        let bus = EventBus::new();
        let store = StateStore::new(bus.clone());
        let router = Router::new(history, bus.clone());
        let loader = Loader::new(
            Rc::clone(&backend),
            store.clone(),
            config.timeline.suggestions,
        );
        let queue = CommandQueue::new();
        let manager = LifecycleManager::new(
            store.clone(),
            router.clone(),
            presenter,
            UnitRegistry::standard(&config),
            queue.clone(),
        );

        let subscriptions = vec![
            subscribe_auth_change(&bus, &store, &storage),
            subscribe_show_view(&bus, &store, &queue),
            subscribe_login_flip(&bus, &router, &queue),
        ];

        Self {
            config,
            backend,
            storage,
            bus,
            store,
            router,
            loader,
            queue,
            manager,
            subscriptions,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn manager(&self) -> &LifecycleManager {
        &self.manager
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Commands waiting for [`App::settle`]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn attach(&self, kind: UnitKind) -> Result<UnitId, LifecycleError> {
        self.manager.attach(kind)
    }

    /// Attach one unit of every kind
    pub fn attach_all(&self) -> Result<Vec<UnitId>, LifecycleError> {
        UnitKind::ALL
            .into_iter()
            .map(|kind| self.manager.attach(kind))
            .collect()
    }

    pub fn detach(&self, id: UnitId) -> Result<(), LifecycleError> {
        self.manager.detach(id)
    }

    pub fn navigate(&self, path: &str) -> View {
        self.router.navigate_to(path)
    }

    pub fn back(&self) -> Option<View> {
        self.router.back()
    }

    pub fn forward(&self) -> Option<View> {
        self.router.forward()
    }

    /// Fire a DOM event at a unit
    ///
    /// Returns `Ok(false)` when nothing is listening, e.g. after the unit was
    /// deactivated.
    pub fn trigger(
        &self,
        id: UnitId,
        target: &str,
        event: DomEvent,
    ) -> Result<bool, LifecycleError> {
        self.manager.interact(id, target, &event)
    }

    /// [`App::trigger`] on the first attached unit of `kind`
    pub fn trigger_kind(
        &self,
        kind: UnitKind,
        target: &str,
        event: DomEvent,
    ) -> Result<bool, LifecycleError> {
        let id = self
            .manager
            .unit_of(kind)
            .ok_or_else(|| LifecycleError::UnknownUnit(kind.to_string()))?;
        self.trigger(id, target, event)
    }

    /// Restore any persisted session, then show the current location
    pub async fn start(&self) -> View {
        match restore_session(self.storage.as_ref()) {
            Ok(Some(persisted)) => self.restore(persisted).await,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "stored session unreadable, clearing");
                if let Err(e) = clear_session(self.storage.as_ref()) {
                    tracing::warn!(error = %e, "failed to clear stored session");
                }
            }
        }

        let view = self.router.on_location_change();
        self.settle().await;
        view
    }

    async fn restore(&self, persisted: PersistedSession) {
        let username = persisted.user.username.clone();
        self.store
            .update(StatePatch::new().session(persisted.into_session()));

        match self.loader.load(DataNeed::OwnProfile).await {
            Ok(_) => tracing::info!(%username, "session restored"),
            Err(e) if e.is_authentication() => {
                tracing::info!(%username, error = %e, "stored session rejected");
                self.bus.publish(Event::logged_out());
            }
            Err(e) => self.report(e),
        }
    }

    /// Run queued commands until nothing is queued or in flight
    ///
    /// Synchronous commands run immediately; loads and calls run
    /// concurrently. Several `settle` calls may drain the same queue at once.
    pub async fn settle(&self) {
        let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, ()>> = FuturesUnordered::new();
        loop {
            while let Some(queued) = self.queue.pop() {
                match queued.command {
                    Command::Publish(event) => self.bus.publish(event),
                    Command::Navigate(path) => {
                        self.router.navigate_to(&path);
                    }
                    Command::DismissError => self.store.update(StatePatch::new().error(None)),
                    Command::Load(need) => in_flight.push(self.load(need).boxed_local()),
                    Command::Call(call) => {
                        in_flight.push(self.perform(queued.origin, call).boxed_local())
                    }
                }
            }
            if in_flight.next().await.is_none() {
                break;
            }
        }
    }

    async fn load(&self, need: DataNeed) {
        match self.loader.load(need.clone()).await {
            Ok(outcome) => tracing::debug!(?need, ?outcome, "load finished"),
            Err(e) => self.report(e),
        }
    }

    async fn perform(&self, origin: Option<UnitId>, call: ApiCall) {
        let name = call.name();
        match self.call(call).await {
            Ok(outcome) => {
                tracing::debug!(call = name, "backend call succeeded");
                self.deliver(origin, &outcome);
            }
            Err(e) => {
                self.deliver(origin, &Outcome::Failed(e.failure()));
                self.report(e);
            }
        }
    }

    async fn call(&self, call: ApiCall) -> ApiResult<Outcome> {
        match call {
            ApiCall::Login(credentials) => {
                let grant = self
                    .backend
                    .login(&credentials.username, &credentials.password)
                    .await?;
                Ok(Outcome::Authenticated {
                    user: UserRef::new(credentials.username),
                    token: grant.token,
                })
            }
            ApiCall::Register(credentials) => {
                let grant = self
                    .backend
                    .register(&credentials.username, &credentials.password)
                    .await?;
                Ok(Outcome::Authenticated {
                    user: UserRef::new(credentials.username),
                    token: grant.token,
                })
            }
            ApiCall::PostItem { content } => {
                let (sender, token) = self.credential()?;
                let receipt = self.backend.post_item(&content, &token).await?;
                Ok(Outcome::Posted {
                    item: Item {
                        id: receipt.id.unwrap_or(ItemId::UNASSIGNED),
                        sender_username: sender,
                        content,
                        sent_timestamp: Utc::now(),
                    },
                })
            }
            ApiCall::Follow { username } => {
                let (_, token) = self.credential()?;
                self.backend.follow(&username, &token).await?;
                tracing::info!(%username, "followed");
                Ok(Outcome::Followed { username })
            }
            ApiCall::Like { id } => {
                let (_, token) = self.credential()?;
                self.backend.like(id, &token).await?;
                Ok(Outcome::Liked { id })
            }
        }
    }

    /// Username and token of the current session
    fn credential(&self) -> ApiResult<(String, String)> {
        let state = self.store.get();
        match (state.session.username(), state.session.auth_token()) {
            (Some(username), Some(token)) => Ok((username.to_string(), token.to_string())),
            _ => Err(ApiError::Authentication("Not logged in".to_string())),
        }
    }

    fn deliver(&self, origin: Option<UnitId>, outcome: &Outcome) {
        if let Some(id) = origin {
            self.manager.deliver(id, outcome);
        }
    }

    /// Surface a backend failure on the error display
    ///
    /// A rejected credential also ends the session and sends the user to the
    /// login view.
    fn report(&self, error: ApiError) {
        tracing::warn!(error = %error, "backend request failed");
        let failure = error.failure();

        if error.is_authentication() && self.store.get().is_logged_in() {
            self.bus.publish(Event::logged_out());
            self.router.navigate_to("/login");
        }
        self.store.update(StatePatch::new().error(Some(ErrorNotice {
            detail: failure.detail,
            status: failure.status,
        })));
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.manager.detach_all();
        for handle in self.subscriptions.drain(..) {
            self.bus.unsubscribe(handle);
        }
    }
}

fn subscribe_auth_change(
    bus: &EventBus,
    store: &StateStore,
    storage: &Rc<dyn SessionStorage>,
) -> SubscriptionHandle {
    let store = store.clone();
    let storage = Rc::clone(storage);
    bus.subscribe(EventKind::AuthChange, move |event| {
        let Event::AuthChange {
            is_logged_in,
            user,
            token,
        } = event
        else {
            return;
        };

        match (*is_logged_in, user, token) {
            (true, Some(user), Some(token)) => {
                tracing::info!(username = %user.username, "logged in");
                let persisted = PersistedSession {
                    token: token.clone(),
                    user: user.clone(),
                };
                if let Err(e) = persist_session(storage.as_ref(), &persisted) {
                    tracing::warn!(error = %e, "failed to persist session");
                }
                store.update(StatePatch::new().session(Session::logged_in(user.clone(), token.clone())));
            }
            (true, _, _) => {
                tracing::warn!("auth-change without user or token ignored");
            }
            (false, _, _) => {
                tracing::info!("logged out");
                if let Err(e) = clear_session(storage.as_ref()) {
                    tracing::warn!(error = %e, "failed to clear stored session");
                }
                store.reset();
            }
        }
    })
}

fn subscribe_show_view(
    bus: &EventBus,
    store: &StateStore,
    queue: &CommandQueue,
) -> SubscriptionHandle {
    let store = store.clone();
    let queue = queue.clone();
    bus.subscribe(EventKind::ShowView, move |event| {
        if let Event::ShowView { view } = event {
            let layout = compose(view, &store.get().session);
            queue.extend(None, layout.needs.into_iter().map(Command::Load).collect());
        }
    })
}

fn subscribe_login_flip(bus: &EventBus, router: &Router, queue: &CommandQueue) -> SubscriptionHandle {
    let router = router.clone();
    let queue = queue.clone();
    let logged_in = Cell::new(false);
    bus.subscribe(EventKind::StateChange, move |event| {
        let Event::StateChange { state } = event else {
            return;
        };
        let now = state.is_logged_in();
        if now && !logged_in.get() {
            let layout = compose(&router.current_view(), &state.session);
            queue.extend(None, layout.needs.into_iter().map(Command::Load).collect());
        }
        logged_in.set(now);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;
    use crate::presentation::Document;
    use crate::router::MemoryHistory;
    use crate::service::session::MemorySessionStorage;
    use crate::state::AppState;

    fn app_with(backend: MockBackend) -> (App, Rc<MockBackend>, Rc<MemorySessionStorage>) {
        let backend = Rc::new(backend);
        let storage = Rc::new(MemorySessionStorage::new());
        let app = App::new(
            Config::default_config(),
            backend.clone(),
            storage.clone(),
            Rc::new(Document::standard()),
            Rc::new(MemoryHistory::default()),
        );
        (app, backend, storage)
    }

    #[test]
    fn test_auth_change_round_trip_restores_empty_state() {
        let (app, _, storage) = app_with(MockBackend::new());

        app.bus()
            .publish(Event::logged_in(UserRef::new("amy"), "T"));
        assert!(app.store().get().is_logged_in());
        assert_eq!(storage.len(), 2);

        app.bus().publish(Event::logged_out());
        assert_eq!(*app.store().get(), AppState::default());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_auth_change_without_token_is_ignored() {
        let (app, _, _) = app_with(MockBackend::new());
        app.bus().publish(Event::AuthChange {
            is_logged_in: true,
            user: Some(UserRef::new("amy")),
            token: None,
        });
        assert!(!app.store().get().is_logged_in());
    }

    #[test]
    fn test_show_view_queues_layout_needs() {
        let (app, _, _) = app_with(MockBackend::new());
        app.navigate("/profile/bob");
        assert_eq!(app.pending(), 1);
        app.navigate("/profile/bob");
        assert_eq!(app.pending(), 1);
    }

    #[test]
    fn test_login_flip_queues_current_needs() {
        let (app, _, _) = app_with(MockBackend::new());
        app.bus()
            .publish(Event::logged_in(UserRef::new("amy"), "T"));
        // feed, own profile, suggestions for home
        assert_eq!(app.pending(), 3);
    }

    #[tokio::test]
    async fn test_authentication_failure_logs_out() {
        let (app, backend, storage) = app_with(MockBackend::new().with_user("amy", "hunter2"));
        app.bus().publish(Event::logged_in(
            UserRef::new("amy"),
            MockBackend::token_for("amy"),
        ));
        backend.expire_tokens();

        app.settle().await;

        let state = app.store().get();
        assert!(!state.is_logged_in());
        assert!(state.error.is_some());
        assert!(storage.is_empty());
        assert_eq!(app.router().current_view(), View::Login);
    }

    #[tokio::test]
    async fn test_server_failure_keeps_session() {
        let (app, backend, _) = app_with(MockBackend::new());
        backend.fail_next(ApiError::Server {
            status: 500,
            detail: "Internal Server Error".to_string(),
        });
        app.navigate("/hashtag/rust");
        app.settle().await;

        let error = app.store().get().error.clone().unwrap();
        assert_eq!(error.status, Some(500));
        assert_eq!(app.router().current_view(), View::Hashtag {
            hashtag: "rust".to_string()
        });
    }
}
