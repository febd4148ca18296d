//! View composition
//!
//! Decides, for a view and a session, which unit kinds are visible and what
//! data the view needs. This is a pure function: it never talks to the
//! backend, it only describes the requests the coordinator should make.

use std::collections::BTreeSet;

use crate::types::{ItemId, Session, View};
use crate::units::UnitKind;

/// Data a view needs from the backend
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DataNeed {
    /// Home timeline of the logged-in user
    Feed,
    /// Own profile of the logged-in user
    OwnProfile,
    /// Public profile (with recent blooms) of a user
    Profile(String),
    /// Blooms mentioning a hashtag
    Hashtag(String),
    /// A single bloom
    Item(ItemId),
    /// Who-to-follow suggestions
    Suggestions,
}

/// Visibility and data requirements of a view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub visible: BTreeSet<UnitKind>,
    pub needs: Vec<DataNeed>,
}

impl Layout {
    pub fn shows(&self, kind: UnitKind) -> bool {
        self.visible.contains(&kind)
    }

    fn show(mut self, kind: UnitKind) -> Self {
        self.visible.insert(kind);
        self
    }

    fn need(mut self, need: DataNeed) -> Self {
        self.needs.push(need);
        self
    }

    /// Login prompt or logout button, depending on the session
    fn auth_controls(self, session: &Session) -> Self {
        if session.is_logged_in() {
            self.show(UnitKind::Logout)
        } else {
            self.show(UnitKind::Login)
        }
    }
}

/// Compose the layout for `view` under `session`
pub fn compose(view: &View, session: &Session) -> Layout {
    let layout = Layout::default().show(UnitKind::ErrorSurface);
    let logged_in = session.is_logged_in();

    match view {
        View::Home if logged_in => layout
            .show(UnitKind::Profile)
            .show(UnitKind::Timeline)
            .show(UnitKind::Composer)
            .show(UnitKind::Logout)
            .show(UnitKind::WhoToFollow)
            .need(DataNeed::Feed)
            .need(DataNeed::OwnProfile)
            .need(DataNeed::Suggestions),
        View::Home => layout.show(UnitKind::Login),
        View::Login if logged_in => layout.show(UnitKind::Logout),
        View::Login => layout.show(UnitKind::Login),
        View::Signup if logged_in => layout.show(UnitKind::Logout),
        View::Signup => layout.show(UnitKind::Signup),
        View::Profile { username } => {
            let layout = layout
                .show(UnitKind::Profile)
                .show(UnitKind::Timeline)
                .auth_controls(session)
                .need(DataNeed::Profile(username.clone()));
            if session.is_self(username) {
                layout.show(UnitKind::Composer)
            } else {
                layout
            }
        }
        View::Hashtag { hashtag } => layout
            .show(UnitKind::Timeline)
            .auth_controls(session)
            .need(DataNeed::Hashtag(hashtag.clone())),
        View::Item { id } => layout
            .show(UnitKind::Timeline)
            .auth_controls(session)
            .need(DataNeed::Item(*id)),
    }
}
