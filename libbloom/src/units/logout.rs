//! Logout button

use crate::presentation::{DomEvent, DomEventKind, Rendered};
use crate::service::events::Event;

use super::{Binding, Command, Unit, UnitContext, UnitKind};

pub struct LogoutButton;

impl Unit for LogoutButton {
    fn kind(&self) -> UnitKind {
        UnitKind::Logout
    }

    fn requires_auth(&self) -> bool {
        true
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![Binding::new("logout", DomEventKind::Click)]
    }

    fn on_interaction(
        &mut self,
        target: &str,
        _event: &DomEvent,
        ctx: &UnitContext<'_>,
    ) -> Vec<Command> {
        if target != "logout" || !ctx.state.is_logged_in() {
            return Vec::new();
        }
        tracing::info!(username = ?ctx.state.session.username(), "logging out");
        vec![
            Command::Publish(Event::logged_out()),
            Command::Navigate("/".to_string()),
        ]
    }

    fn render(&self, ctx: &UnitContext<'_>) -> Rendered {
        let who = ctx.state.session.username().unwrap_or_default();
        Rendered::new("Account").line(format!("Logged in as @{}  [Log out]", who))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use crate::types::View;
    use crate::units::test_support::logged_in_state;

    #[test]
    fn test_click_logs_out() {
        let state = logged_in_state("amy");
        let view = View::Home;
        let ctx = UnitContext { state: &state, view: &view };
        let mut button = LogoutButton;

        assert!(button.render(&ctx).contains("@amy"));
        assert_eq!(
            button.on_interaction("logout", &DomEvent::click(), &ctx),
            vec![
                Command::Publish(Event::logged_out()),
                Command::Navigate("/".to_string())
            ]
        );
    }

    #[test]
    fn test_click_without_session_is_ignored() {
        let state = AppState::default();
        let view = View::Home;
        let ctx = UnitContext { state: &state, view: &view };
        assert!(LogoutButton
            .on_interaction("logout", &DomEvent::click(), &ctx)
            .is_empty());
    }
}
