//! Profile panel: username, counts and the follow action

use crate::presentation::{DomEvent, DomEventKind, Rendered};
use crate::state::AppState;
use crate::types::{Item, Profile, View};
use crate::view::DataNeed;

use super::{clicked_username, ApiCall, Binding, Command, Outcome, Unit, UnitContext, UnitKind};

const BINDINGS: [Binding; 1] = [Binding::new("follow", DomEventKind::Click)];

#[derive(Default)]
pub struct ProfilePanel;

impl ProfilePanel {
    pub fn new() -> Self {
        Self
    }

    /// Profile shown for the view: own profile at home, the named one otherwise
    fn shown<'a>(state: &'a AppState, view: &View) -> Option<&'a Profile> {
        match view {
            View::Home => state.own_profile(),
            View::Profile { username } => state.profile(username),
            _ => None,
        }
    }
}

impl Unit for ProfilePanel {
    fn kind(&self) -> UnitKind {
        UnitKind::Profile
    }

    fn bindings(&self) -> Vec<Binding> {
        BINDINGS.to_vec()
    }

    fn on_item_posted(&mut self, item: &Item, ctx: &UnitContext<'_>) -> Vec<Command> {
        match ctx.view {
            View::Profile { username } if *username == item.sender_username => {
                vec![Command::Load(DataNeed::Profile(username.clone()))]
            }
            _ => Vec::new(),
        }
    }

    fn on_interaction(
        &mut self,
        target: &str,
        event: &DomEvent,
        ctx: &UnitContext<'_>,
    ) -> Vec<Command> {
        if target != "follow" || !ctx.state.is_logged_in() {
            return Vec::new();
        }
        let Some(username) = clicked_username(event, ctx.view) else {
            return Vec::new();
        };
        let can_follow = ctx
            .state
            .profile(&username)
            .map_or(true, Profile::can_follow);
        if can_follow && !ctx.state.session.is_self(&username) {
            vec![Command::Call(ApiCall::Follow { username })]
        } else {
            Vec::new()
        }
    }

    fn on_outcome(&mut self, outcome: &Outcome, ctx: &UnitContext<'_>) -> Vec<Command> {
        match outcome {
            Outcome::Followed { username } => {
                let mut commands = vec![Command::Load(DataNeed::Profile(username.clone()))];
                if ctx.state.is_logged_in() {
                    commands.push(Command::Load(DataNeed::OwnProfile));
                }
                commands
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, ctx: &UnitContext<'_>) -> Rendered {
        let profile = match Self::shown(ctx.state, ctx.view) {
            Some(profile) => profile,
            None => {
                let heading = match ctx.view {
                    View::Profile { username } => format!("@{}", username),
                    _ => "Profile".to_string(),
                };
                return Rendered::new(heading).line("Loading...");
            }
        };

        let mut rendered = Rendered::new(format!("@{}", profile.username))
            .line(format!("{} blooms", profile.total_items))
            .line(format!("{} followers", profile.followers.len()))
            .line(format!("{} following", profile.follows.len()));

        if ctx.state.is_logged_in() {
            if profile.is_following {
                rendered = rendered.line("Following");
            } else if profile.can_follow() && !ctx.state.session.is_self(&profile.username) {
                rendered = rendered.line("[Follow]");
            }
        }
        rendered
    }
}
