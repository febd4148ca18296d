//! Login form

use crate::presentation::{DomEvent, DomEventKind, Rendered};
use crate::service::events::Event;
use crate::service::validation::validate_credentials;
use crate::types::View;

use super::{ApiCall, Binding, Command, Credentials, Outcome, Unit, UnitContext, UnitKind};

const BINDINGS: [Binding; 2] = [
    Binding::new("login", DomEventKind::Submit),
    Binding::new("signup-link", DomEventKind::Click),
];

/// Read `username`/`password` from a submitted form
pub(crate) fn credentials_from(event: &DomEvent) -> Option<Credentials> {
    match event {
        DomEvent::Submit(fields) => Some(Credentials {
            username: fields.get("username").cloned().unwrap_or_default().trim().to_string(),
            password: fields.get("password").cloned().unwrap_or_default(),
        }),
        _ => None,
    }
}

/// Commands for a successful login or signup
pub(crate) fn authenticated(outcome: &Outcome, view: &View) -> Vec<Command> {
    match outcome {
        Outcome::Authenticated { user, token } => {
            tracing::info!(username = %user.username, "logged in");
            let mut commands = vec![Command::Publish(Event::logged_in(user.clone(), token.clone()))];
            if matches!(view, View::Login | View::Signup) {
                commands.push(Command::Navigate("/".to_string()));
            }
            commands
        }
        _ => Vec::new(),
    }
}

#[derive(Default)]
pub struct LoginForm {
    inline_error: Option<String>,
    pending: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Unit for LoginForm {
    fn kind(&self) -> UnitKind {
        UnitKind::Login
    }

    fn bindings(&self) -> Vec<Binding> {
        BINDINGS.to_vec()
    }

    fn on_state_change(&mut self, ctx: &UnitContext<'_>) -> Vec<Command> {
        if ctx.state.is_logged_in() {
            self.inline_error = None;
        }
        Vec::new()
    }

    fn on_interaction(
        &mut self,
        target: &str,
        event: &DomEvent,
        ctx: &UnitContext<'_>,
    ) -> Vec<Command> {
        if target == "signup-link" {
            return vec![Command::Navigate("/signup".to_string())];
        }
        if target != "login" || self.pending || ctx.state.is_logged_in() {
            return Vec::new();
        }
        let Some(credentials) = credentials_from(event) else {
            return Vec::new();
        };

        match validate_credentials(&credentials.username, &credentials.password) {
            Ok(()) => {
                self.inline_error = None;
                self.pending = true;
                vec![Command::Call(ApiCall::Login(credentials))]
            }
            Err(e) => {
                self.inline_error = Some(e.to_string());
                Vec::new()
            }
        }
    }

    fn on_outcome(&mut self, outcome: &Outcome, ctx: &UnitContext<'_>) -> Vec<Command> {
        self.pending = false;
        if let Outcome::Failed(failure) = outcome {
            self.inline_error = Some(failure.detail.clone());
        }
        authenticated(outcome, ctx.view)
    }

    fn render(&self, _ctx: &UnitContext<'_>) -> Rendered {
        let mut rendered = Rendered::new("Log in").line("Log in to see the forest");
        if let Some(error) = &self.inline_error {
            rendered = rendered.line(format!("! {}", error));
        }
        if self.pending {
            rendered = rendered.line("Logging in...");
        }
        rendered.line("No account? Sign up")
    }
}
