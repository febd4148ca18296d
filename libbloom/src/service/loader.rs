//! Backend fetches merged into the State Store
//!
//! Every fetch suspends on the backend, and the world may move on in the
//! meantime: the user navigates to another profile, or logs out. A result is
//! applied only if, when it arrives,
//!
//! 1. no newer request was started on the same channel ([`RequestFence`]), and
//! 2. the auth token is the one captured when the request started.
//!
//! Anything else is discarded and logged at debug level.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::api::{ApiResult, Backend, Suggestion};
use crate::state::{StatePatch, StateStore};
use crate::types::{sort_newest_first, Item, OwnProfile, Profile};
use crate::view::DataNeed;

/// Independent request streams; a new request supersedes older ones on the same channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Feed,
    OwnProfile,
    Profile,
    Hashtag,
    Item,
    Suggestions,
}

impl DataNeed {
    pub fn channel(&self) -> Channel {
        match self {
            DataNeed::Feed => Channel::Feed,
            DataNeed::OwnProfile => Channel::OwnProfile,
            DataNeed::Profile(_) => Channel::Profile,
            DataNeed::Hashtag(_) => Channel::Hashtag,
            DataNeed::Item(_) => Channel::Item,
            DataNeed::Suggestions => Channel::Suggestions,
        }
    }
}

/// Proof of which request generation a response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    channel: Channel,
    generation: u64,
}

/// Monotonic request generations per channel
#[derive(Debug, Clone, Default)]
pub struct RequestFence {
    generations: Rc<RefCell<BTreeMap<Channel, u64>>>,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any in flight on `channel`
    pub fn begin(&self, channel: Channel) -> Ticket {
        let mut generations = self.generations.borrow_mut();
        let generation = generations.entry(channel).or_insert(0);
        *generation += 1;
        Ticket {
            channel,
            generation: *generation,
        }
    }

    /// True if no request was started on the ticket's channel since
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.generations.borrow().get(&ticket.channel).copied() == Some(ticket.generation)
    }
}

/// What happened to a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result was merged into the store
    Applied,
    /// The result arrived after it was superseded
    Discarded,
    /// Nothing was requested (the need requires a session)
    Skipped,
}

enum Fetched {
    Feed(Vec<Item>),
    OwnProfile(OwnProfile),
    Profile(String, Profile),
    Hashtag(String, Vec<Item>),
    Item(Item),
    Suggestions(Vec<Suggestion>),
}

/// Turns [`DataNeed`]s into fenced backend requests
#[derive(Clone)]
pub struct Loader {
    backend: Rc<dyn Backend>,
    store: StateStore,
    fence: RequestFence,
    suggestion_limit: usize,
}

impl Loader {
    pub fn new(backend: Rc<dyn Backend>, store: StateStore, suggestion_limit: usize) -> Self {
        Self {
            backend,
            store,
            fence: RequestFence::new(),
            suggestion_limit,
        }
    }

    pub fn fence(&self) -> &RequestFence {
        &self.fence
    }

    /// Fetch `need` and merge the result, unless superseded meanwhile
    ///
    /// Errors from superseded requests are swallowed as well.
    pub async fn load(&self, need: DataNeed) -> ApiResult<LoadOutcome> {
        let ticket = self.fence.begin(need.channel());
        let token = self.store.get().session.auth_token().map(str::to_string);

        let result = self.fetch(&need, token.as_deref()).await;

        if !self.fence.is_current(&ticket) {
            tracing::debug!(?need, "discarding superseded response");
            return Ok(LoadOutcome::Discarded);
        }
        if self.store.get().session.auth_token() != token.as_deref() {
            tracing::debug!(?need, "discarding response from a previous session");
            return Ok(LoadOutcome::Discarded);
        }

        match result? {
            Some(fetched) => {
                self.apply(fetched);
                Ok(LoadOutcome::Applied)
            }
            None => Ok(LoadOutcome::Skipped),
        }
    }

    async fn fetch(&self, need: &DataNeed, token: Option<&str>) -> ApiResult<Option<Fetched>> {
        let fetched = match (need, token) {
            (DataNeed::Feed, Some(token)) => Fetched::Feed(self.backend.feed(token).await?),
            (DataNeed::OwnProfile, Some(token)) => {
                Fetched::OwnProfile(self.backend.own_profile(token).await?)
            }
            (DataNeed::Suggestions, Some(token)) => Fetched::Suggestions(
                self.backend
                    .suggested_follows(self.suggestion_limit, token)
                    .await?,
            ),
            (DataNeed::Feed | DataNeed::OwnProfile | DataNeed::Suggestions, None) => {
                return Ok(None)
            }
            (DataNeed::Profile(username), token) => Fetched::Profile(
                username.clone(),
                self.backend.profile(username, token).await?,
            ),
            (DataNeed::Hashtag(tag), _) => {
                Fetched::Hashtag(tag.clone(), self.backend.items_by_hashtag(tag).await?)
            }
            (DataNeed::Item(id), _) => Fetched::Item(self.backend.item(*id).await?),
        };
        Ok(Some(fetched))
    }

    fn apply(&self, fetched: Fetched) {
        let state = self.store.get();
        let patch = match fetched {
            Fetched::Feed(mut items) => {
                sort_newest_first(&mut items);
                StatePatch::new().feed(items)
            }
            Fetched::OwnProfile(own) => {
                let mut profiles = state.profiles.clone();
                let profile = profiles
                    .entry(own.username.clone())
                    .or_insert_with(|| Profile::new(own.username.clone()));
                profile.followers = own.followers;
                profile.follows = own.follows;
                profile.is_self = true;
                StatePatch::new().profiles(profiles)
            }
            Fetched::Profile(username, mut profile) => {
                sort_newest_first(&mut profile.recent_items);
                let mut profiles = state.profiles.clone();
                profiles.insert(username, profile);
                StatePatch::new().profiles(profiles)
            }
            Fetched::Hashtag(tag, mut items) => {
                sort_newest_first(&mut items);
                let mut hashtags = state.hashtags.clone();
                hashtags.insert(tag, items);
                StatePatch::new().hashtags(hashtags)
            }
            Fetched::Item(item) => {
                let mut items = state.items.clone();
                items.insert(item.id, item);
                StatePatch::new().items(items)
            }
            Fetched::Suggestions(suggestions) => StatePatch::new().suggestions(
                suggestions
                    .into_iter()
                    .map(|suggestion| suggestion.username)
                    .collect(),
            ),
        };
        self.store.update(patch);
    }
}
