//! Timeline of blooms for the current view

use chrono::Utc;

use crate::presentation::{DomEvent, DomEventKind, Rendered};
use crate::types::{format_age, Item, ItemId, View};
use crate::view::DataNeed;

use super::{ApiCall, Binding, Command, Outcome, Unit, UnitContext, UnitKind};

const BINDINGS: [Binding; 3] = [
    Binding::new("like", DomEventKind::Click),
    Binding::new("sender", DomEventKind::Click),
    Binding::new("hashtag", DomEventKind::Click),
];

#[derive(Default)]
pub struct Timeline {
    liked: Vec<ItemId>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blooms shown for `view`, newest first
    pub fn items<'a>(ctx: &UnitContext<'a>) -> Vec<&'a Item> {
        let state = ctx.state;
        match ctx.view {
            View::Home => state.feed.iter().collect(),
            View::Profile { username } => state
                .profile(username)
                .map(|profile| profile.recent_items.iter().collect())
                .unwrap_or_default(),
            View::Hashtag { hashtag } => state.hashtag_items(hashtag).iter().collect(),
            View::Item { id } => state.items.get(id).into_iter().collect(),
            View::Login | View::Signup => Vec::new(),
        }
    }

    fn heading(view: &View) -> String {
        match view {
            View::Home => "Your Forest".to_string(),
            View::Profile { username } => format!("Blooms by @{}", username),
            View::Hashtag { hashtag } => format!("#{}", hashtag),
            View::Item { .. } => "Bloom".to_string(),
            View::Login | View::Signup => String::new(),
        }
    }

    /// Data to refresh after a bloom was posted, given what is on screen
    fn refresh_for(item: &Item, view: &View) -> Option<DataNeed> {
        match view {
            View::Home => Some(DataNeed::Feed),
            View::Profile { username } if *username == item.sender_username => {
                Some(DataNeed::Profile(username.clone()))
            }
            View::Hashtag { hashtag } if item.mentions_hashtag(hashtag) => {
                Some(DataNeed::Hashtag(hashtag.clone()))
            }
            _ => None,
        }
    }
}

impl Unit for Timeline {
    fn kind(&self) -> UnitKind {
        UnitKind::Timeline
    }

    fn bindings(&self) -> Vec<Binding> {
        BINDINGS.to_vec()
    }

    fn on_item_posted(&mut self, item: &Item, ctx: &UnitContext<'_>) -> Vec<Command> {
        Self::refresh_for(item, ctx.view)
            .map(Command::Load)
            .into_iter()
            .collect()
    }

    fn on_interaction(
        &mut self,
        target: &str,
        event: &DomEvent,
        ctx: &UnitContext<'_>,
    ) -> Vec<Command> {
        let value = match event {
            DomEvent::Click { value: Some(value) } => value.as_str(),
            _ => return Vec::new(),
        };

        match target {
            "like" => match value.parse::<ItemId>() {
                Ok(id) if ctx.state.is_logged_in() => vec![Command::Call(ApiCall::Like { id })],
                _ => Vec::new(),
            },
            "sender" => vec![Command::Navigate(format!("/profile/{}", value))],
            "hashtag" => vec![Command::Navigate(format!(
                "/hashtag/{}",
                value.trim_start_matches('#')
            ))],
            _ => Vec::new(),
        }
    }

    fn on_outcome(&mut self, outcome: &Outcome, _ctx: &UnitContext<'_>) -> Vec<Command> {
        if let Outcome::Liked { id } = outcome {
            self.liked.push(*id);
        }
        Vec::new()
    }

    fn render(&self, ctx: &UnitContext<'_>) -> Rendered {
        let now = Utc::now();
        let items = Self::items(ctx);
        let mut rendered = Rendered::new(Self::heading(ctx.view));

        if items.is_empty() {
            return rendered.line("No blooms yet");
        }

        for item in items {
            let liked = if self.liked.contains(&item.id) { " ♥" } else { "" };
            rendered = rendered.line(format!(
                "[{}] @{} · {} · {}{}",
                item.id,
                item.sender_username,
                format_age(item.sent_timestamp, now),
                item.content,
                liked
            ));
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use crate::types::{Profile, Session};
    use chrono::Utc;

    fn item(id: i64, sender: &str, content: &str) -> Item {
        Item {
            id: ItemId(id),
            sender_username: sender.to_string(),
            content: content.to_string(),
            sent_timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_items_follow_the_view() {
        let mut state = AppState::default();
        state.feed = vec![item(1, "amy", "in feed")];
        let mut bob = Profile::new("bob");
        bob.recent_items = vec![item(2, "bob", "by bob")];
        state.profiles.insert("bob".to_string(), bob);
        state
            .hashtags
            .insert("moss".to_string(), vec![item(3, "cy", "#moss")]);

        let home = View::Home;
        let ctx = UnitContext { state: &state, view: &home };
        assert_eq!(Timeline::items(&ctx)[0].content, "in feed");

        let profile = View::Profile {
            username: "bob".to_string(),
        };
        let ctx = UnitContext { state: &state, view: &profile };
        assert_eq!(Timeline::items(&ctx)[0].content, "by bob");
        assert!(Timeline::new().render(&ctx).contains("Blooms by @bob"));

        let hashtag = View::Hashtag {
            hashtag: "moss".to_string(),
        };
        let ctx = UnitContext { state: &state, view: &hashtag };
        assert_eq!(Timeline::items(&ctx).len(), 1);
    }

    #[test]
    fn test_empty_timeline() {
        let state = AppState::default();
        let view = View::Home;
        let rendered = Timeline::new().render(&UnitContext { state: &state, view: &view });
        assert_eq!(rendered.heading.as_deref(), Some("Your Forest"));
        assert!(rendered.contains("No blooms yet"));
    }

    #[test]
    fn test_refresh_after_post_depends_on_view() {
        let posted = item(9, "amy", "hello #moss");
        assert_eq!(Timeline::refresh_for(&posted, &View::Home), Some(DataNeed::Feed));
        assert_eq!(
            Timeline::refresh_for(
                &posted,
                &View::Profile {
                    username: "amy".to_string()
                }
            ),
            Some(DataNeed::Profile("amy".to_string()))
        );
        assert_eq!(
            Timeline::refresh_for(
                &posted,
                &View::Profile {
                    username: "bob".to_string()
                }
            ),
            None
        );
        assert_eq!(
            Timeline::refresh_for(
                &posted,
                &View::Hashtag {
                    hashtag: "MOSS".to_string()
                }
            ),
            Some(DataNeed::Hashtag("MOSS".to_string()))
        );
    }

    #[test]
    fn test_clicks() {
        let mut state = AppState::default();
        let view = View::Home;
        let mut timeline = Timeline::new();

        let ctx = UnitContext { state: &state, view: &view };
        assert_eq!(
            timeline.on_interaction("sender", &DomEvent::click_on("bob"), &ctx),
            vec![Command::Navigate("/profile/bob".to_string())]
        );
        assert_eq!(
            timeline.on_interaction("hashtag", &DomEvent::click_on("#moss"), &ctx),
            vec![Command::Navigate("/hashtag/moss".to_string())]
        );
        // Liking needs a session
        assert!(timeline
            .on_interaction("like", &DomEvent::click_on("4"), &ctx)
            .is_empty());

        state.session = Session::logged_in(crate::types::UserRef::new("amy"), "T");
        let ctx = UnitContext { state: &state, view: &view };
        assert_eq!(
            timeline.on_interaction("like", &DomEvent::click_on("4"), &ctx),
            vec![Command::Call(ApiCall::Like { id: ItemId(4) })]
        );
    }
}
