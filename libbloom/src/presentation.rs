//! Presentation layer boundary
//!
//! Units never touch a document directly. The lifecycle manager mounts their
//! templates, binds their listeners and pushes their rendered output through
//! a [`Presenter`]. [`Document`] is the in-memory implementation used by the
//! terminal shell and by tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::LifecycleError;
use crate::units::{UnitId, UnitKind};

/// Output of [`crate::units::Unit::render`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub heading: Option<String>,
    pub lines: Vec<String>,
}

impl Rendered {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: Some(heading.into()),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.heading.as_deref().map_or(false, |h| h.contains(needle))
            || self.lines.iter().any(|line| line.contains(needle))
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(heading) = &self.heading {
            writeln!(f, "== {} ==", heading)?;
        }
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DomEventKind {
    Click,
    Submit,
    Input,
}

/// A user interaction delivered to a bound element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    /// Click; `value` identifies the clicked entry in a list (bloom id, username)
    Click { value: Option<String> },
    /// Form submission with named fields
    Submit(BTreeMap<String, String>),
    /// Text input with the element's new value
    Input(String),
}

impl DomEvent {
    pub fn click() -> Self {
        DomEvent::Click { value: None }
    }

    pub fn click_on(value: impl Into<String>) -> Self {
        DomEvent::Click {
            value: Some(value.into()),
        }
    }

    pub fn submit<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        DomEvent::Submit(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn kind(&self) -> DomEventKind {
        match self {
            DomEvent::Click { .. } => DomEventKind::Click,
            DomEvent::Submit(_) => DomEventKind::Submit,
            DomEvent::Input(_) => DomEventKind::Input,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Where units are materialized and displayed
pub trait Presenter {
    /// Materialize the unit's structure from the named template
    fn mount(&self, unit: UnitId, template: &str) -> Result<(), LifecycleError>;

    /// Remove the unit's structure and any listeners still bound to it
    fn unmount(&self, unit: UnitId);

    fn is_mounted(&self, unit: UnitId) -> bool;

    fn set_hidden(&self, unit: UnitId, hidden: bool);

    fn is_hidden(&self, unit: UnitId) -> bool;

    fn render(&self, unit: UnitId, rendered: Rendered);

    fn listen(&self, unit: UnitId, target: &str, kind: DomEventKind) -> ListenerId;

    /// Returns false if the listener was not bound
    fn unlisten(&self, listener: ListenerId) -> bool;

    fn listener_count(&self, unit: UnitId) -> usize;

    /// Fire `event` on the unit's `target` element
    ///
    /// Returns whether a bound listener received it.
    fn dispatch(&self, unit: UnitId, target: &str, event: &DomEvent) -> bool;
}

#[derive(Debug)]
struct Node {
    order: u64,
    template: String,
    hidden: bool,
    content: Rendered,
}

#[derive(Debug)]
struct Listener {
    unit: UnitId,
    target: String,
    kind: DomEventKind,
}

/// In-memory document
#[derive(Debug, Default)]
pub struct Document {
    templates: BTreeSet<String>,
    nodes: RefCell<BTreeMap<UnitId, Node>>,
    listeners: RefCell<BTreeMap<ListenerId, Listener>>,
    next_id: Cell<u64>,
    mounts: Cell<usize>,
}

impl Document {
    pub fn with_templates<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Document defining a template for every unit kind
    pub fn standard() -> Self {
        Self::with_templates(UnitKind::ALL.iter().map(|kind| kind.template()))
    }

    /// Total number of successful mounts since creation
    pub fn mount_count(&self) -> usize {
        self.mounts.get()
    }

    pub fn content(&self, unit: UnitId) -> Option<Rendered> {
        self.nodes
            .borrow()
            .get(&unit)
            .map(|node| node.content.clone())
    }

    /// Visible nodes in mount order, as `(template, content)`
    pub fn visible(&self) -> Vec<(String, Rendered)> {
        let nodes = self.nodes.borrow();
        let mut visible: Vec<&Node> = nodes.values().filter(|node| !node.hidden).collect();
        visible.sort_by_key(|node| node.order);
        visible
            .into_iter()
            .map(|node| (node.template.clone(), node.content.clone()))
            .collect()
    }

    /// Text of every visible node
    pub fn text(&self) -> String {
        self.visible()
            .into_iter()
            .map(|(_, content)| content.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

impl Presenter for Document {
    fn mount(&self, unit: UnitId, template: &str) -> Result<(), LifecycleError> {
        if !self.templates.contains(template) {
            return Err(LifecycleError::MissingTemplate(template.to_string()));
        }
        let order = self.next();
        self.nodes.borrow_mut().insert(
            unit,
            Node {
                order,
                template: template.to_string(),
                hidden: true,
                content: Rendered::default(),
            },
        );
        self.mounts.set(self.mounts.get() + 1);
        Ok(())
    }

    fn unmount(&self, unit: UnitId) {
        self.nodes.borrow_mut().remove(&unit);
        self.listeners
            .borrow_mut()
            .retain(|_, listener| listener.unit != unit);
    }

    fn is_mounted(&self, unit: UnitId) -> bool {
        self.nodes.borrow().contains_key(&unit)
    }

    fn set_hidden(&self, unit: UnitId, hidden: bool) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(&unit) {
            node.hidden = hidden;
        }
    }

    fn is_hidden(&self, unit: UnitId) -> bool {
        self.nodes.borrow().get(&unit).map_or(true, |node| node.hidden)
    }

    fn render(&self, unit: UnitId, rendered: Rendered) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(&unit) {
            node.content = rendered;
        }
    }

    fn listen(&self, unit: UnitId, target: &str, kind: DomEventKind) -> ListenerId {
        let id = ListenerId(self.next());
        self.listeners.borrow_mut().insert(
            id,
            Listener {
                unit,
                target: target.to_string(),
                kind,
            },
        );
        id
    }

    fn unlisten(&self, listener: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(&listener).is_some()
    }

    fn listener_count(&self, unit: UnitId) -> usize {
        self.listeners
            .borrow()
            .values()
            .filter(|listener| listener.unit == unit)
            .count()
    }

    fn dispatch(&self, unit: UnitId, target: &str, event: &DomEvent) -> bool {
        if !self.is_mounted(unit) {
            return false;
        }
        let kind = event.kind();
        self.listeners
            .borrow()
            .values()
            .any(|l| l.unit == unit && l.target == target && l.kind == kind)
    }
}
