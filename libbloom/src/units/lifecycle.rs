//! UI unit lifecycle manager
//!
//! Drives each attached unit through
//!
//! ```text
//! Uninitialized ──activate──▶ Active ──detach──▶ TornDown
//!       ▲                        │
//!       └──────deactivate────────┘   (auth-gated units, on logout)
//! ```
//!
//! Materialization (mounting the template) happens at most once per
//! activation cycle and listener binding is exactly symmetric with unbinding,
//! so repeated activations never accumulate listeners. Bus handlers hold only
//! a weak reference to the manager; a detached unit has no live handler left.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::error::LifecycleError;
use crate::presentation::{DomEvent, ListenerId, Presenter};
use crate::router::Router;
use crate::service::events::{Event, EventKind, SubscriptionHandle};
use crate::state::{AppState, StateStore};
use crate::types::View;
use crate::view::compose;

use super::{ActivationState, Command, Outcome, Unit, UnitContext, UnitId, UnitKind, UnitRegistry};

/// A command together with the unit that issued it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queued {
    pub origin: Option<UnitId>,
    pub command: Command,
}

/// FIFO of commands waiting for the coordinator
///
/// A `Load` identical to one still waiting is dropped.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    inner: Rc<RefCell<VecDeque<Queued>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, origin: Option<UnitId>, command: Command) {
        let mut inner = self.inner.borrow_mut();
        if matches!(command, Command::Load(_)) && inner.iter().any(|q| q.command == command) {
            return;
        }
        inner.push_back(Queued { origin, command });
    }

    pub fn extend(&self, origin: Option<UnitId>, commands: Vec<Command>) {
        for command in commands {
            self.push(origin, command);
        }
    }

    pub fn pop(&self) -> Option<Queued> {
        self.inner.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Remove and return everything waiting
    pub fn take(&self) -> Vec<Queued> {
        self.inner.borrow_mut().drain(..).collect()
    }
}

/// Torn-down ids remembered for [`LifecycleManager::state_of`]
const TORN_DOWN_MEMORY: usize = 64;

struct UnitSlot {
    id: UnitId,
    unit: Box<dyn Unit>,
    state: Rc<Cell<ActivationState>>,
    materialized: bool,
    listeners: Vec<ListenerId>,
    subscriptions: Vec<SubscriptionHandle>,
    /// Login status seen with the last state-change
    logged_in: bool,
}

/// Slot plus what can be read while a handler holds it
struct SlotEntry {
    id: UnitId,
    kind: UnitKind,
    state: Rc<Cell<ActivationState>>,
    slot: Rc<RefCell<UnitSlot>>,
}

struct ManagerInner {
    store: StateStore,
    router: Router,
    presenter: Rc<dyn Presenter>,
    registry: UnitRegistry,
    queue: CommandQueue,
    slots: RefCell<Vec<SlotEntry>>,
    torn_down: RefCell<VecDeque<UnitId>>,
}

/// Lifecycle manager for attached units
#[derive(Clone)]
pub struct LifecycleManager {
    inner: Rc<ManagerInner>,
}

impl LifecycleManager {
    pub fn new(
        store: StateStore,
        router: Router,
        presenter: Rc<dyn Presenter>,
        registry: UnitRegistry,
        queue: CommandQueue,
    ) -> Self {
        Self {
            inner: Rc::new(ManagerInner {
                store,
                router,
                presenter,
                registry,
                queue,
                slots: RefCell::new(Vec::new()),
                torn_down: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Construct a unit of `kind` and attach it
    ///
    /// Auth-gated units attached while logged out stay `Uninitialized` (hidden,
    /// but subscribed). A materialization failure is logged and leaves the
    /// unit `Uninitialized`; only an unregistered kind is an error.
    pub fn attach(&self, kind: UnitKind) -> Result<UnitId, LifecycleError> {
        let unit = self.inner.registry.create(kind)?;
        let id = UnitId::new();
        let logged_in = self.inner.store.get().is_logged_in();
        let gated = unit.requires_auth() && !logged_in;

        let bus = self.inner.store.bus();
        let weak: Weak<ManagerInner> = Rc::downgrade(&self.inner);
        let subscriptions = [EventKind::StateChange, EventKind::ShowView, EventKind::ItemPosted]
            .into_iter()
            .map(|kind| {
                let weak = weak.clone();
                bus.subscribe(kind, move |event| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_event(id, event);
                    }
                })
            })
            .collect();

        let state = Rc::new(Cell::new(ActivationState::Uninitialized));
        let slot = Rc::new(RefCell::new(UnitSlot {
            id,
            unit,
            state: Rc::clone(&state),
            materialized: false,
            listeners: Vec::new(),
            subscriptions,
            logged_in,
        }));
        self.inner.slots.borrow_mut().push(SlotEntry {
            id,
            kind,
            state,
            slot: Rc::clone(&slot),
        });
        tracing::debug!(unit = %kind, %id, gated, "unit attached");

        if !gated {
            // Failure is logged and contained
            let _ = self.inner.activate(&mut slot.borrow_mut());
        }
        Ok(id)
    }

    /// `Uninitialized → Active`; a no-op on an active unit
    pub fn activate(&self, id: UnitId) -> Result<(), LifecycleError> {
        let slot = self.inner.slot(id)?;
        let mut slot = slot.borrow_mut();
        self.inner.activate(&mut slot)
    }

    /// `Active → Uninitialized`; a no-op otherwise
    pub fn deactivate(&self, id: UnitId) -> Result<(), LifecycleError> {
        let slot = self.inner.slot(id)?;
        let mut slot = slot.borrow_mut();
        self.inner.deactivate(&mut slot);
        Ok(())
    }

    /// Permanently remove a unit, releasing every subscription and listener
    pub fn detach(&self, id: UnitId) -> Result<(), LifecycleError> {
        let slot = {
            let mut slots = self.inner.slots.borrow_mut();
            let index = slots
                .iter()
                .position(|entry| entry.id == id)
                .ok_or_else(|| LifecycleError::UnknownUnit(id.to_string()))?;
            slots.remove(index).slot
        };

        let mut slot = slot.borrow_mut();
        let bus = self.inner.store.bus();
        for handle in slot.subscriptions.drain(..) {
            bus.unsubscribe(handle);
        }
        for listener in slot.listeners.drain(..) {
            self.inner.presenter.unlisten(listener);
        }
        if slot.materialized {
            self.inner.presenter.unmount(id);
            slot.materialized = false;
        }
        slot.unit.on_detach();
        slot.state.set(ActivationState::TornDown);
        {
            let mut torn_down = self.inner.torn_down.borrow_mut();
            if torn_down.len() == TORN_DOWN_MEMORY {
                torn_down.pop_front();
            }
            torn_down.push_back(id);
        }
        tracing::debug!(unit = %slot.unit.kind(), %id, "unit detached");
        Ok(())
    }

    /// Detach every unit
    pub fn detach_all(&self) {
        for id in self.unit_ids() {
            let _ = self.detach(id);
        }
    }

    /// Fire a user interaction at a unit
    ///
    /// Returns false when no listener is bound for it, in which case the unit
    /// is not called.
    pub fn interact(
        &self,
        id: UnitId,
        target: &str,
        event: &DomEvent,
    ) -> Result<bool, LifecycleError> {
        let slot = self.inner.slot(id)?;
        if !self.inner.presenter.dispatch(id, target, event) {
            tracing::debug!(%id, target, "no listener bound");
            return Ok(false);
        }

        let mut slot = slot.borrow_mut();
        if slot.state.get() != ActivationState::Active {
            return Ok(false);
        }
        let state = self.inner.store.get();
        let view = self.inner.router.current_view();
        let commands = slot
            .unit
            .on_interaction(target, event, &UnitContext { state: &state, view: &view });
        self.inner.queue.extend(Some(id), commands);
        self.inner.refresh(&slot, &state, &view);
        Ok(true)
    }

    /// Hand a backend outcome to the unit that asked for it
    ///
    /// Dropped if the unit is gone or no longer active.
    pub fn deliver(&self, id: UnitId, outcome: &Outcome) {
        let Ok(slot) = self.inner.slot(id) else {
            tracing::debug!(%id, "outcome for detached unit dropped");
            return;
        };
        let mut slot = slot.borrow_mut();
        if slot.state.get() != ActivationState::Active {
            return;
        }
        let state = self.inner.store.get();
        let view = self.inner.router.current_view();
        let commands = slot
            .unit
            .on_outcome(outcome, &UnitContext { state: &state, view: &view });
        self.inner.queue.extend(Some(id), commands);
        self.inner.refresh(&slot, &state, &view);
    }

    /// Current state; readable while the unit is handling an event
    ///
    /// Only the most recently detached units are remembered as `TornDown`,
    /// older ones report `None`.
    pub fn state_of(&self, id: UnitId) -> Option<ActivationState> {
        if self.inner.torn_down.borrow().contains(&id) {
            return Some(ActivationState::TornDown);
        }
        self.inner
            .slots
            .borrow()
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.state.get())
    }

    /// First attached unit of `kind`
    pub fn unit_of(&self, kind: UnitKind) -> Option<UnitId> {
        self.inner
            .slots
            .borrow()
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.id)
    }

    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.inner
            .slots
            .borrow()
            .iter()
            .map(|entry| entry.id)
            .collect()
    }

    /// Listeners currently bound for the unit
    pub fn listener_count(&self, id: UnitId) -> usize {
        self.inner.presenter.listener_count(id)
    }

    /// Bus subscriptions held by the unit
    pub fn subscription_count(&self, id: UnitId) -> usize {
        self.inner
            .slot(id)
            .map(|slot| slot.borrow().subscriptions.len())
            .unwrap_or(0)
    }

    pub fn is_visible(&self, id: UnitId) -> bool {
        self.inner.presenter.is_mounted(id) && !self.inner.presenter.is_hidden(id)
    }
}

impl ManagerInner {
    fn slot(&self, id: UnitId) -> Result<Rc<RefCell<UnitSlot>>, LifecycleError> {
        self.slots
            .borrow()
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| Rc::clone(&entry.slot))
            .ok_or_else(|| LifecycleError::UnknownUnit(id.to_string()))
    }

    fn activate(&self, slot: &mut UnitSlot) -> Result<(), LifecycleError> {
        let kind = slot.unit.kind();
        match slot.state.get() {
            ActivationState::Active => return Ok(()),
            ActivationState::TornDown => return Err(LifecycleError::TornDown(kind.to_string())),
            ActivationState::Uninitialized => {}
        }

        if !slot.materialized {
            if let Err(e) = self.presenter.mount(slot.id, kind.template()) {
                tracing::error!(unit = %kind, id = %slot.id, error = %e, "failed to materialize unit");
                return Err(e);
            }
            slot.materialized = true;
        }

        for binding in slot.unit.bindings() {
            let listener = self.presenter.listen(slot.id, binding.target, binding.kind);
            slot.listeners.push(listener);
        }
        slot.state.set(ActivationState::Active);
        tracing::debug!(unit = %kind, id = %slot.id, listeners = slot.listeners.len(), "unit activated");

        let state = self.store.get();
        let view = self.router.current_view();
        let commands = slot
            .unit
            .on_activate(&UnitContext { state: &state, view: &view });
        self.queue.extend(Some(slot.id), commands);
        self.refresh(slot, &state, &view);
        Ok(())
    }

    fn deactivate(&self, slot: &mut UnitSlot) {
        if slot.state.get() != ActivationState::Active {
            return;
        }
        for listener in slot.listeners.drain(..) {
            self.presenter.unlisten(listener);
        }
        self.presenter.set_hidden(slot.id, true);
        if !slot.unit.retains_structure() {
            self.presenter.unmount(slot.id);
            slot.materialized = false;
        }
        slot.unit.on_deactivate();
        slot.state.set(ActivationState::Uninitialized);
        tracing::debug!(unit = %slot.unit.kind(), id = %slot.id, "unit deactivated");
    }

    /// Re-render and recompute visibility
    fn refresh(&self, slot: &UnitSlot, state: &AppState, view: &View) {
        if !slot.materialized {
            return;
        }
        let active = slot.state.get() == ActivationState::Active;
        if active {
            let rendered = slot.unit.render(&UnitContext { state, view });
            self.presenter.render(slot.id, rendered);
        }
        let visible = active
            && compose(view, &state.session).shows(slot.unit.kind())
            && slot.unit.is_presentable(state);
        self.presenter.set_hidden(slot.id, !visible);
    }

    fn on_event(&self, id: UnitId, event: &Event) {
        let Ok(slot) = self.slot(id) else {
            return;
        };
        let Ok(mut slot) = slot.try_borrow_mut() else {
            tracing::warn!(%id, event = %event.kind(), "unit busy, event skipped");
            return;
        };

        match event {
            Event::StateChange { state } => {
                let now = state.is_logged_in();
                let was = std::mem::replace(&mut slot.logged_in, now);
                if slot.unit.requires_auth() && was != now {
                    if now {
                        let _ = self.activate(&mut slot);
                    } else {
                        self.deactivate(&mut slot);
                    }
                }

                let view = self.router.current_view();
                if slot.state.get() == ActivationState::Active {
                    let commands = slot
                        .unit
                        .on_state_change(&UnitContext { state, view: &view });
                    self.queue.extend(Some(id), commands);
                }
                self.refresh(&slot, state, &view);
            }
            Event::ShowView { view } => {
                let state = self.store.get();
                if slot.state.get() == ActivationState::Active {
                    let commands = slot
                        .unit
                        .on_show_view(&UnitContext { state: &state, view });
                    self.queue.extend(Some(id), commands);
                }
                self.refresh(&slot, &state, view);
            }
            Event::ItemPosted { item } => {
                if slot.state.get() == ActivationState::Active {
                    let state = self.store.get();
                    let view = self.router.current_view();
                    let commands = slot
                        .unit
                        .on_item_posted(item, &UnitContext { state: &state, view: &view });
                    self.queue.extend(Some(id), commands);
                }
            }
            Event::AuthChange { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::presentation::Document;
    use crate::router::MemoryHistory;
    use crate::service::events::EventBus;
    use crate::state::StatePatch;
    use crate::types::{ErrorNotice, Session, UserRef};
    use crate::view::DataNeed;

    struct Harness {
        bus: EventBus,
        store: StateStore,
        router: Router,
        document: Rc<Document>,
        queue: CommandQueue,
        manager: LifecycleManager,
    }

    fn harness_with(document: Document) -> Harness {
        let bus = EventBus::new();
        let store = StateStore::new(bus.clone());
        let router = Router::new(Rc::new(MemoryHistory::default()), bus.clone());
        let document = Rc::new(document);
        let queue = CommandQueue::new();
        let manager = LifecycleManager::new(
            store.clone(),
            router.clone(),
            document.clone(),
            UnitRegistry::standard(&Config::default_config()),
            queue.clone(),
        );
        Harness {
            bus,
            store,
            router,
            document,
            queue,
            manager,
        }
    }

    fn harness() -> Harness {
        harness_with(Document::standard())
    }

    fn log_in(store: &StateStore) {
        store.update(StatePatch::new().session(Session::logged_in(UserRef::new("amy"), "T")));
    }

    #[test]
    fn test_queue_dedupes_waiting_loads() {
        let queue = CommandQueue::new();
        queue.push(None, Command::Load(DataNeed::Feed));
        queue.push(None, Command::Load(DataNeed::Feed));
        queue.push(None, Command::Navigate("/".to_string()));
        queue.push(None, Command::Navigate("/".to_string()));
        assert_eq!(queue.len(), 3);

        queue.pop();
        queue.push(None, Command::Load(DataNeed::Feed));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_open_unit_activates_on_attach() {
        let h = harness();
        let id = h.manager.attach(UnitKind::Timeline).unwrap();
        assert_eq!(h.manager.state_of(id), Some(ActivationState::Active));
        assert_eq!(h.manager.listener_count(id), 3);
        assert_eq!(h.manager.subscription_count(id), 3);
    }

    #[test]
    fn test_gated_unit_waits_for_login() {
        let h = harness();
        let id = h.manager.attach(UnitKind::Composer).unwrap();
        assert_eq!(h.manager.state_of(id), Some(ActivationState::Uninitialized));
        assert_eq!(h.manager.listener_count(id), 0);
        assert!(!h.manager.is_visible(id));
        assert_eq!(h.document.mount_count(), 0);

        log_in(&h.store);
        assert_eq!(h.manager.state_of(id), Some(ActivationState::Active));
        assert_eq!(h.manager.listener_count(id), 2);
        assert!(h.manager.is_visible(id));
    }

    #[test]
    fn test_activation_is_idempotent() {
        let h = harness();
        log_in(&h.store);
        let id = h.manager.attach(UnitKind::Composer).unwrap();
        let listeners = h.manager.listener_count(id);

        h.manager.activate(id).unwrap();
        h.manager.activate(id).unwrap();
        assert_eq!(h.manager.listener_count(id), listeners);
        assert_eq!(h.document.mount_count(), 1);

        // Further state changes while logged in do not re-activate
        log_in(&h.store);
        assert_eq!(h.manager.listener_count(id), listeners);
    }

    #[test]
    fn test_logout_unbinds_and_relogin_does_not_duplicate() {
        let h = harness();
        log_in(&h.store);
        let composer = h.manager.attach(UnitKind::Composer).unwrap();

        h.store.reset();
        assert_eq!(h.manager.state_of(composer), Some(ActivationState::Uninitialized));
        assert_eq!(h.manager.listener_count(composer), 0);
        assert!(!h.manager.is_visible(composer));
        // Structure is retained
        assert!(h.document.is_mounted(composer));

        log_in(&h.store);
        assert_eq!(h.manager.listener_count(composer), 2);
        assert_eq!(h.document.mount_count(), 1);
    }

    #[test]
    fn test_non_retaining_unit_is_rebuilt() {
        let h = harness();
        log_in(&h.store);
        let id = h.manager.attach(UnitKind::WhoToFollow).unwrap();
        assert_eq!(
            h.queue.take(),
            vec![Queued {
                origin: Some(id),
                command: Command::Load(DataNeed::Suggestions)
            }]
        );

        h.store.reset();
        assert!(!h.document.is_mounted(id));

        log_in(&h.store);
        assert!(h.document.is_mounted(id));
        assert_eq!(h.document.mount_count(), 2);
        assert_eq!(h.queue.take().len(), 1);
    }

    #[test]
    fn test_detach_releases_subscriptions() {
        let h = harness();
        let before = h.bus.subscriber_count();
        let id = h.manager.attach(UnitKind::Login).unwrap();
        assert_eq!(h.bus.subscriber_count(), before + 3);

        h.manager.detach(id).unwrap();
        assert_eq!(h.bus.subscriber_count(), before);
        assert_eq!(h.manager.state_of(id), Some(ActivationState::TornDown));
        assert!(!h.document.is_mounted(id));
        assert_eq!(h.manager.listener_count(id), 0);

        // Events after detach reach nothing
        log_in(&h.store);
        assert!(h.queue.is_empty());
        assert!(matches!(
            h.manager.detach(id),
            Err(LifecycleError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_detach_gated_unit_that_never_activated() {
        let h = harness();
        let before = h.bus.subscriber_count();
        let id = h.manager.attach(UnitKind::Logout).unwrap();
        h.manager.detach(id).unwrap();
        assert_eq!(h.bus.subscriber_count(), before);
    }

    #[test]
    fn test_missing_template_is_contained() {
        let h = harness_with(Document::with_templates(["timeline", "login"]));
        log_in(&h.store);

        let composer = h.manager.attach(UnitKind::Composer).unwrap();
        let timeline = h.manager.attach(UnitKind::Timeline).unwrap();

        assert_eq!(h.manager.state_of(composer), Some(ActivationState::Uninitialized));
        assert_eq!(h.manager.listener_count(composer), 0);
        assert_eq!(h.manager.state_of(timeline), Some(ActivationState::Active));

        // Siblings keep receiving events
        h.router.navigate_to("/");
        assert!(h.manager.is_visible(timeline));
        assert!(matches!(
            h.manager.activate(composer),
            Err(LifecycleError::MissingTemplate(_))
        ));
    }

    #[test]
    fn test_visibility_follows_view() {
        let h = harness();
        log_in(&h.store);
        let composer = h.manager.attach(UnitKind::Composer).unwrap();
        let login = h.manager.attach(UnitKind::Login).unwrap();

        h.router.navigate_to("/");
        assert!(h.manager.is_visible(composer));
        assert!(!h.manager.is_visible(login));

        h.router.navigate_to("/profile/bob");
        assert!(!h.manager.is_visible(composer));

        h.router.navigate_to("/profile/amy");
        assert!(h.manager.is_visible(composer));
    }

    #[test]
    fn test_error_surface_presents_only_with_error() {
        let h = harness();
        let id = h.manager.attach(UnitKind::ErrorSurface).unwrap();
        assert!(!h.manager.is_visible(id));

        h.store.update(StatePatch::new().error(Some(ErrorNotice {
            detail: "boom".to_string(),
            status: None,
        })));
        assert!(h.manager.is_visible(id));
        assert!(h.document.content(id).unwrap().contains("boom"));
    }

    #[test]
    fn test_interaction_requires_bound_listener() {
        let h = harness();
        log_in(&h.store);
        let logout = h.manager.attach(UnitKind::Logout).unwrap();

        assert!(h.manager.interact(logout, "logout", &DomEvent::click()).unwrap());
        let queued = h.queue.take();
        assert_eq!(queued[0].command, Command::Publish(Event::logged_out()));
        assert_eq!(queued[0].origin, Some(logout));

        h.manager.deactivate(logout).unwrap();
        assert!(!h.manager.interact(logout, "logout", &DomEvent::click()).unwrap());
        assert!(h.queue.is_empty());
    }

    #[test]
    fn test_busy_unit_skips_event_but_stays_known() {
        let h = harness();
        let id = h.manager.attach(UnitKind::Timeline).unwrap();
        h.queue.take();

        let slot = h.manager.inner.slot(id).unwrap();
        let held = slot.borrow_mut();
        h.router.navigate_to("/profile/bob");

        assert!(h.queue.is_empty());
        assert!(h.manager.inner.slot(id).is_ok());
        assert_eq!(h.manager.state_of(id), Some(ActivationState::Active));
        assert_eq!(h.manager.unit_of(UnitKind::Timeline), Some(id));
        assert_eq!(h.manager.unit_ids(), vec![id]);
        drop(held);

        h.manager.detach(id).unwrap();
        assert_eq!(h.manager.state_of(id), Some(ActivationState::TornDown));
    }

    #[test]
    fn test_torn_down_memory_is_bounded() {
        let h = harness();
        let ids: Vec<UnitId> = (0..=TORN_DOWN_MEMORY)
            .map(|_| {
                let id = h.manager.attach(UnitKind::Login).unwrap();
                h.manager.detach(id).unwrap();
                id
            })
            .collect();

        assert_eq!(h.manager.inner.torn_down.borrow().len(), TORN_DOWN_MEMORY);
        assert_eq!(h.manager.state_of(ids[0]), None);
        assert_eq!(h.manager.state_of(ids[1]), Some(ActivationState::TornDown));
        assert_eq!(
            h.manager.state_of(ids[TORN_DOWN_MEMORY]),
            Some(ActivationState::TornDown)
        );
    }

    #[test]
    fn test_unit_of_and_detach_all() {
        let h = harness();
        let login = h.manager.attach(UnitKind::Login).unwrap();
        h.manager.attach(UnitKind::Timeline).unwrap();
        assert_eq!(h.manager.unit_of(UnitKind::Login), Some(login));
        assert_eq!(h.manager.unit_of(UnitKind::Signup), None);

        h.manager.detach_all();
        assert!(h.manager.unit_ids().is_empty());
        assert_eq!(h.bus.subscriber_count(), 0);
    }
}
