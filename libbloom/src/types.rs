//! Core types for Bloom

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a bloom, in characters
pub const MAX_ITEM_CHARS: usize = 280;

/// Reference to a user account
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub username: String,
}

impl UserRef {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// The authenticated-user portion of application state
///
/// Fields are private so that `is_logged_in()` always agrees with the
/// presence of both a user and a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    current_user: Option<UserRef>,
    auth_token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user: UserRef, token: impl Into<String>) -> Self {
        Self {
            current_user: Some(user),
            auth_token: Some(token.into()),
        }
    }

    pub fn current_user(&self) -> Option<&UserRef> {
        self.current_user.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.current_user.as_ref().map(|user| user.username.as_str())
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some() && self.auth_token.is_some()
    }

    /// True when the session belongs to `username`
    pub fn is_self(&self, username: &str) -> bool {
        self.is_logged_in() && self.username() == Some(username)
    }
}

/// Identifier of a bloom
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl ItemId {
    /// Placeholder for a locally composed bloom the server has not numbered
    pub const UNASSIGNED: ItemId = ItemId(0);
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(ItemId)
    }
}

/// A single short post ("bloom")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(rename = "sender")]
    pub sender_username: String,
    pub content: String,
    #[serde(deserialize_with = "wire_timestamp::deserialize")]
    pub sent_timestamp: DateTime<Utc>,
}

/// Timestamps arrive as RFC 3339, or as RFC 2822 from some server builds
mod wire_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .or_else(|_| DateTime::parse_from_rfc2822(&raw))
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}

impl Item {
    /// Hashtags mentioned in the content, without the leading `#`
    pub fn hashtags(&self) -> Vec<String> {
        extract_hashtags(&self.content)
    }

    pub fn mentions_hashtag(&self, tag: &str) -> bool {
        let tag = tag.trim_start_matches('#');
        self.hashtags().iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Sort blooms newest first, breaking ties by descending id
pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| {
        b.sent_timestamp
            .cmp(&a.sent_timestamp)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Extract `#tag` words from free text
pub fn extract_hashtags(content: &str) -> Vec<String> {
    content
        .split_whitespace()
        .filter_map(|word| word.strip_prefix('#'))
        .map(|tag| {
            tag.trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '_'))
                .to_string()
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Human-readable age of a timestamp relative to `now` (`42s`, `5m`, `3h`, `2d`, `Jul 15`)
pub fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds().max(0);
    if seconds < 60 {
        return format!("{}s", seconds);
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{}d", days);
    }
    timestamp.format("%b %-d").to_string()
}

/// A user's public profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub followers: BTreeSet<String>,
    #[serde(default)]
    pub follows: BTreeSet<String>,
    #[serde(rename = "total_blooms", default)]
    pub total_items: usize,
    #[serde(rename = "recent_blooms", default)]
    pub recent_items: Vec<Item>,
    #[serde(default)]
    pub is_following: bool,
    #[serde(default)]
    pub is_self: bool,
}

impl Profile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            followers: BTreeSet::new(),
            follows: BTreeSet::new(),
            total_items: 0,
            recent_items: Vec::new(),
            is_following: false,
            is_self: false,
        }
    }

    /// Whether a follow action makes sense for this profile
    pub fn can_follow(&self) -> bool {
        !self.is_self && !self.is_following
    }
}

/// The own-profile response (`GET /profile`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnProfile {
    pub username: String,
    #[serde(default)]
    pub followers: BTreeSet<String>,
    #[serde(default)]
    pub follows: BTreeSet<String>,
}

/// Logical screen derived from the current address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", content = "params", rename_all = "lowercase")]
pub enum View {
    Home,
    Login,
    Signup,
    Profile { username: String },
    Hashtag { hashtag: String },
    #[serde(rename = "bloom")]
    Item { id: ItemId },
}

impl Default for View {
    fn default() -> Self {
        View::Home
    }
}

impl View {
    /// Name carried in the `show-view` payload
    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Login => "login",
            View::Signup => "signup",
            View::Profile { .. } => "profile",
            View::Hashtag { .. } => "hashtag",
            View::Item { .. } => "bloom",
        }
    }

    pub fn params(&self) -> ViewParams {
        match self {
            View::Profile { username } => ViewParams {
                username: Some(username.clone()),
                ..ViewParams::default()
            },
            View::Hashtag { hashtag } => ViewParams {
                hashtag: Some(hashtag.clone()),
                ..ViewParams::default()
            },
            View::Item { id } => ViewParams {
                id: Some(*id),
                ..ViewParams::default()
            },
            _ => ViewParams::default(),
        }
    }

    /// Canonical address for this view
    pub fn path(&self) -> String {
        match self {
            View::Home => "/".to_string(),
            View::Login => "/login".to_string(),
            View::Signup => "/signup".to_string(),
            View::Profile { username } => format!("/profile/{}", username),
            View::Hashtag { hashtag } => format!("/hashtag/{}", hashtag),
            View::Item { id } => format!("/bloom/{}", id),
        }
    }
}

/// Optional parameters of a view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
}

/// Message shown on the single error surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub detail: String,
    pub status: Option<u16>,
}

impl From<crate::error::ApiFailure> for ErrorNotice {
    fn from(failure: crate::error::ApiFailure) -> Self {
        Self {
            detail: failure.detail,
            status: failure.status,
        }
    }
}
