//! Who-to-follow suggestions
//!
//! Rebuilt from scratch on every login: the structure is dropped on logout
//! and suggestions are fetched again when the unit reactivates.

use crate::presentation::{DomEvent, DomEventKind, Rendered};
use crate::view::DataNeed;

use super::{ApiCall, Binding, Command, Outcome, Unit, UnitContext, UnitKind};

#[derive(Default)]
pub struct WhoToFollow {
    followed: Vec<String>,
}

impl WhoToFollow {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Unit for WhoToFollow {
    fn kind(&self) -> UnitKind {
        UnitKind::WhoToFollow
    }

    fn requires_auth(&self) -> bool {
        true
    }

    fn retains_structure(&self) -> bool {
        false
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![Binding::new("follow", DomEventKind::Click)]
    }

    fn on_activate(&mut self, _ctx: &UnitContext<'_>) -> Vec<Command> {
        vec![Command::Load(DataNeed::Suggestions)]
    }

    fn on_deactivate(&mut self) {
        self.followed.clear();
    }

    fn on_interaction(
        &mut self,
        target: &str,
        event: &DomEvent,
        ctx: &UnitContext<'_>,
    ) -> Vec<Command> {
        match (target, event) {
            ("follow", DomEvent::Click { value: Some(username) })
                if ctx.state.suggestions.contains(username) =>
            {
                vec![Command::Call(ApiCall::Follow {
                    username: username.clone(),
                })]
            }
            _ => Vec::new(),
        }
    }

    fn on_outcome(&mut self, outcome: &Outcome, _ctx: &UnitContext<'_>) -> Vec<Command> {
        match outcome {
            Outcome::Followed { username } => {
                self.followed.push(username.clone());
                vec![
                    Command::Load(DataNeed::Suggestions),
                    Command::Load(DataNeed::Feed),
                    Command::Load(DataNeed::OwnProfile),
                ]
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, ctx: &UnitContext<'_>) -> Rendered {
        let rendered = Rendered::new("Who to follow");
        let suggestions: Vec<String> = ctx
            .state
            .suggestions
            .iter()
            .filter(|username| !self.followed.contains(username))
            .map(|username| format!("@{}  [Follow]", username))
            .collect();
        if suggestions.is_empty() {
            rendered.line("You follow everyone!")
        } else {
            rendered.lines(suggestions)
        }
    }
}
