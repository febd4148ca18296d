//! Signup form

use crate::presentation::{DomEvent, DomEventKind, Rendered};
use crate::service::validation::validate_signup;

use super::login::{authenticated, credentials_from};
use super::{ApiCall, Binding, Command, Outcome, Unit, UnitContext, UnitKind};

const BINDINGS: [Binding; 2] = [
    Binding::new("signup", DomEventKind::Submit),
    Binding::new("login-link", DomEventKind::Click),
];

#[derive(Default)]
pub struct SignupForm {
    inline_error: Option<String>,
    pending: bool,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Unit for SignupForm {
    fn kind(&self) -> UnitKind {
        UnitKind::Signup
    }

    fn bindings(&self) -> Vec<Binding> {
        BINDINGS.to_vec()
    }

    fn on_interaction(
        &mut self,
        target: &str,
        event: &DomEvent,
        ctx: &UnitContext<'_>,
    ) -> Vec<Command> {
        if target == "login-link" {
            return vec![Command::Navigate("/login".to_string())];
        }
        if target != "signup" || self.pending || ctx.state.is_logged_in() {
            return Vec::new();
        }
        let (Some(credentials), DomEvent::Submit(fields)) = (credentials_from(event), event)
        else {
            return Vec::new();
        };

        let confirmation = fields.get("confirm_password").map(String::as_str);
        match validate_signup(&credentials.username, &credentials.password, confirmation) {
            Ok(()) => {
                self.inline_error = None;
                self.pending = true;
                vec![Command::Call(ApiCall::Register(credentials))]
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
        let mut rendered = Rendered::new("Sign up").line("Join the forest");
        if let Some(error) = &self.inline_error {
            rendered = rendered.line(format!("! {}", error));
        }
        if self.pending {
            rendered = rendered.line("Creating account...");
        }
        rendered.line("Already have an account? Log in")
    }
}
