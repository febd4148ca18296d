//! In-memory backend for tests and offline demos
//!
//! Behaves like the real server (home feed is own plus followed blooms,
//! profiles carry the ten most recent blooms, suggestions skip the caller and
//! anyone already followed) and adds hooks for driving edge cases: a call log,
//! held profile requests, injected failures and token expiry.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Notify;

use super::{ApiResult, AuthGrant, Backend, PostReceipt, Suggestion};
use crate::error::ApiError;
use crate::service::validation::MIN_PASSWORD_LENGTH;
use crate::types::{sort_newest_first, Item, ItemId, OwnProfile, Profile};

const TOKEN_PREFIX: &str = "token-";
const RECENT_ITEMS: usize = 10;

/// A recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub method: &'static str,
    pub arg: Option<String>,
}

#[derive(Debug, Clone)]
struct MockUser {
    password: String,
    follows: BTreeSet<String>,
}

#[derive(Default)]
struct MockData {
    users: BTreeMap<String, MockUser>,
    items: Vec<Item>,
    likes: BTreeMap<ItemId, usize>,
    next_id: i64,
}

/// In-memory backend
pub struct MockBackend {
    data: RefCell<MockData>,
    calls: RefCell<Vec<MockCall>>,
    held_profiles: RefCell<BTreeMap<String, Rc<Notify>>>,
    failures: RefCell<VecDeque<ApiError>>,
    tokens_expired: Cell<bool>,
    epoch: DateTime<Utc>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            data: RefCell::new(MockData::default()),
            calls: RefCell::new(Vec::new()),
            held_profiles: RefCell::new(BTreeMap::new()),
            failures: RefCell::new(VecDeque::new()),
            tokens_expired: Cell::new(false),
            epoch: Utc
                .with_ymd_and_hms(2024, 7, 15, 10, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    /// Token the mock hands out for `username`
    pub fn token_for(username: &str) -> String {
        format!("{}{}", TOKEN_PREFIX, username)
    }

    /// Add an account
    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.add_user(username, password);
        self
    }

    pub fn add_user(&self, username: &str, password: &str) {
        self.data.borrow_mut().users.insert(
            username.to_string(),
            MockUser {
                password: password.to_string(),
                follows: BTreeSet::new(),
            },
        );
    }

    /// Make `follower` follow `followee` without going through the API
    pub fn add_follow(&self, follower: &str, followee: &str) {
        if let Some(user) = self.data.borrow_mut().users.get_mut(follower) {
            user.follows.insert(followee.to_string());
        }
    }

    /// Store a bloom without going through the API
    pub fn seed_item(&self, sender: &str, content: &str) -> ItemId {
        self.insert_item(sender, content).id
    }

    /// Hold the next `profile` request for `username` until the returned
    /// notifier fires
    pub fn hold_profile(&self, username: &str) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        self.held_profiles
            .borrow_mut()
            .insert(username.to_string(), Rc::clone(&gate));
        gate
    }

    /// Fail the next call, whatever it is, with `error`
    pub fn fail_next(&self, error: ApiError) {
        self.failures.borrow_mut().push_back(error);
    }

    /// Reject every token from now on
    pub fn expire_tokens(&self) {
        self.tokens_expired.set(true);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn likes(&self, id: ItemId) -> usize {
        self.data.borrow().likes.get(&id).copied().unwrap_or(0)
    }

    pub fn item_count(&self) -> usize {
        self.data.borrow().items.len()
    }

    pub fn follows(&self, username: &str) -> BTreeSet<String> {
        self.data
            .borrow()
            .users
            .get(username)
            .map(|user| user.follows.clone())
            .unwrap_or_default()
    }

    fn record(&self, method: &'static str, arg: Option<String>) -> ApiResult<()> {
        self.calls.borrow_mut().push(MockCall { method, arg });
        match self.failures.borrow_mut().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn authenticate(&self, token: &str) -> ApiResult<String> {
        if self.tokens_expired.get() {
            return Err(ApiError::Authentication("Token has expired".to_string()));
        }
        let username = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| ApiError::Authentication("Invalid token".to_string()))?;
        if !self.data.borrow().users.contains_key(username) {
            return Err(ApiError::Authentication("Invalid token".to_string()));
        }
        Ok(username.to_string())
    }

    fn insert_item(&self, sender: &str, content: &str) -> Item {
        let mut data = self.data.borrow_mut();
        data.next_id += 1;
        let id = data.next_id;
        let item = Item {
            id: ItemId(id),
            sender_username: sender.to_string(),
            content: content.to_string(),
            sent_timestamp: self.epoch + chrono::Duration::seconds(id),
        };
        data.items.push(item.clone());
        item
    }

    fn items_of(&self, username: &str) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .data
            .borrow()
            .items
            .iter()
            .filter(|item| item.sender_username == username)
            .cloned()
            .collect();
        sort_newest_first(&mut items);
        items
    }

    fn not_found(detail: String) -> ApiError {
        ApiError::Server {
            status: 404,
            detail,
        }
    }
}

#[async_trait(?Send)]
impl Backend for MockBackend {
    async fn login(&self, username: &str, password: &str) -> ApiResult<AuthGrant> {
        self.record("login", Some(username.to_string()))?;
        let data = self.data.borrow();
        let user = data.users.get(username).ok_or_else(|| ApiError::Server {
            status: 403,
            detail: "Unknown user".to_string(),
        })?;
        if user.password != password {
            return Err(ApiError::Server {
                status: 403,
                detail: "Incorrect password".to_string(),
            });
        }
        Ok(AuthGrant {
            token: Self::token_for(username),
        })
    }

    async fn register(&self, username: &str, password: &str) -> ApiResult<AuthGrant> {
        self.record("register", Some(username.to_string()))?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::Server {
                status: 400,
                detail: format!(
                    "Password must be at least {} characters long",
                    MIN_PASSWORD_LENGTH
                ),
            });
        }
        if self.data.borrow().users.contains_key(username) {
            return Err(ApiError::Rejected(format!(
                "User {} already exists",
                username
            )));
        }
        self.add_user(username, password);
        Ok(AuthGrant {
            token: Self::token_for(username),
        })
    }

    async fn own_profile(&self, token: &str) -> ApiResult<OwnProfile> {
        self.record("own_profile", None)?;
        let username = self.authenticate(token)?;
        let data = self.data.borrow();
        let followers = data
            .users
            .iter()
            .filter(|(_, user)| user.follows.contains(&username))
            .map(|(name, _)| name.clone())
            .collect();
        let follows = data
            .users
            .get(&username)
            .map(|user| user.follows.clone())
            .unwrap_or_default();
        Ok(OwnProfile {
            username,
            followers,
            follows,
        })
    }

    async fn profile(&self, username: &str, token: Option<&str>) -> ApiResult<Profile> {
        self.record("profile", Some(username.to_string()))?;

        let gate = self.held_profiles.borrow_mut().remove(username);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let viewer = match token {
            Some(token) => Some(self.authenticate(token)?),
            None => None,
        };

        let (followers, follows) = {
            let data = self.data.borrow();
            let user = data
                .users
                .get(username)
                .ok_or_else(|| Self::not_found(format!("User {} not found", username)))?;
            let followers: BTreeSet<String> = data
                .users
                .iter()
                .filter(|(_, other)| other.follows.contains(username))
                .map(|(name, _)| name.clone())
                .collect();
            (followers, user.follows.clone())
        };

        let items = self.items_of(username);
        let is_following = viewer
            .as_deref()
            .map(|viewer| followers.contains(viewer))
            .unwrap_or(false);
        let is_self = viewer.as_deref() == Some(username);

        Ok(Profile {
            username: username.to_string(),
            total_items: items.len(),
            recent_items: items.into_iter().take(RECENT_ITEMS).collect(),
            followers,
            follows,
            is_following,
            is_self,
        })
    }

    async fn post_item(&self, content: &str, token: &str) -> ApiResult<PostReceipt> {
        self.record("post_item", Some(content.to_string()))?;
        let sender = self.authenticate(token)?;
        let item = self.insert_item(&sender, content);
        Ok(PostReceipt { id: Some(item.id) })
    }

    async fn like(&self, id: ItemId, token: &str) -> ApiResult<()> {
        self.record("like", Some(id.to_string()))?;
        self.authenticate(token)?;
        let mut data = self.data.borrow_mut();
        if !data.items.iter().any(|item| item.id == id) {
            return Err(Self::not_found("Bloom not found".to_string()));
        }
        *data.likes.entry(id).or_insert(0) += 1;
        Ok(())
    }

    async fn follow(&self, username: &str, token: &str) -> ApiResult<()> {
        self.record("follow", Some(username.to_string()))?;
        let follower = self.authenticate(token)?;
        if !self.data.borrow().users.contains_key(username) {
            return Err(Self::not_found(format!(
                "Cannot follow {} - user does not exist",
                username
            )));
        }
        self.add_follow(&follower, username);
        Ok(())
    }

    async fn feed(&self, token: &str) -> ApiResult<Vec<Item>> {
        self.record("feed", None)?;
        let username = self.authenticate(token)?;
        let follows = self.follows(&username);
        let mut items: Vec<Item> = self
            .data
            .borrow()
            .items
            .iter()
            .filter(|item| {
                item.sender_username == username || follows.contains(&item.sender_username)
            })
            .cloned()
            .collect();
        sort_newest_first(&mut items);
        Ok(items)
    }

    async fn items_by_user(&self, username: &str) -> ApiResult<Vec<Item>> {
        self.record("items_by_user", Some(username.to_string()))?;
        Ok(self.items_of(username))
    }

    async fn items_by_hashtag(&self, tag: &str) -> ApiResult<Vec<Item>> {
        self.record("items_by_hashtag", Some(tag.to_string()))?;
        let marker = format!("#{}", tag.trim_start_matches('#'));
        Ok(self
            .data
            .borrow()
            .items
            .iter()
            .filter(|item| item.content.split(' ').any(|word| word == marker))
            .cloned()
            .collect())
    }

    async fn item(&self, id: ItemId) -> ApiResult<Item> {
        self.record("item", Some(id.to_string()))?;
        self.data
            .borrow()
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("Bloom not found".to_string()))
    }

    async fn suggested_follows(&self, limit: usize, token: &str) -> ApiResult<Vec<Suggestion>> {
        self.record("suggested_follows", Some(limit.to_string()))?;
        let username = self.authenticate(token)?;
        let follows = self.follows(&username);
        let data = self.data.borrow();
        let suggestions = data
            .users
            .keys()
            .filter(|name| **name != username && !follows.contains(*name))
            .take(limit)
            .map(|name| Suggestion {
                username: name.clone(),
            })
            .collect();
        Ok(suggestions)
    }
}
