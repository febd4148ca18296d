//! Bloom composer

use crate::presentation::{DomEvent, DomEventKind, Rendered};
use crate::service::events::Event;
use crate::service::validation::ContentValidator;
use crate::state::AppState;

use super::{ApiCall, Binding, Command, Outcome, Unit, UnitContext, UnitKind};

const BINDINGS: [Binding; 2] = [
    Binding::new("content", DomEventKind::Input),
    Binding::new("compose", DomEventKind::Submit),
];

pub struct Composer {
    validator: ContentValidator,
    draft: String,
    inline_error: Option<String>,
    pending: bool,
}

impl Composer {
    pub fn new(max_chars: usize) -> Self {
        Self {
            validator: ContentValidator::new(max_chars),
            draft: String::new(),
            inline_error: None,
            pending: false,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    fn submit(&mut self, content: String, state: &AppState) -> Vec<Command> {
        self.draft = content;

        if self.pending {
            return Vec::new();
        }
        if !state.is_logged_in() {
            self.inline_error = Some(crate::error::ValidationError::NotLoggedIn.to_string());
            return Vec::new();
        }

        match self.validator.validate(&self.draft) {
            Ok(content) => {
                let content = content.to_string();
                self.inline_error = None;
                self.pending = true;
                vec![Command::Call(ApiCall::PostItem { content })]
            }
            Err(e) => {
                tracing::debug!(error = %e, "bloom rejected before posting");
                self.inline_error = Some(e.to_string());
                Vec::new()
            }
        }
    }
}

impl Unit for Composer {
    fn kind(&self) -> UnitKind {
        UnitKind::Composer
    }

    fn requires_auth(&self) -> bool {
        true
    }

    fn bindings(&self) -> Vec<Binding> {
        BINDINGS.to_vec()
    }

    fn on_deactivate(&mut self) {
        self.draft.clear();
        self.inline_error = None;
        self.pending = false;
    }

    fn on_interaction(
        &mut self,
        target: &str,
        event: &DomEvent,
        ctx: &UnitContext<'_>,
    ) -> Vec<Command> {
        match (target, event) {
            ("content", DomEvent::Input(value)) => {
                self.draft = value.clone();
                Vec::new()
            }
            ("compose", DomEvent::Submit(fields)) => {
                let content = fields
                    .get("content")
                    .cloned()
                    .unwrap_or_else(|| self.draft.clone());
                self.submit(content, ctx.state)
            }
            _ => Vec::new(),
        }
    }

    fn on_outcome(&mut self, outcome: &Outcome, _ctx: &UnitContext<'_>) -> Vec<Command> {
        self.pending = false;
        match outcome {
            Outcome::Posted { item } => {
                self.draft.clear();
                self.inline_error = None;
                vec![Command::Publish(Event::ItemPosted { item: item.clone() })]
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, _ctx: &UnitContext<'_>) -> Rendered {
        let mut rendered = Rendered::new("Compose a bloom")
            .line(self.draft.clone())
            .line(self.validator.counter(&self.draft));
        if let Some(error) = &self.inline_error {
            rendered = rendered.line(format!("! {}", error));
        }
        if self.pending {
            rendered = rendered.line("Posting...");
        }
        rendered
    }
}
