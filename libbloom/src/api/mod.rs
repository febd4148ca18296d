//! Backend API boundary
//!
//! Every server interaction goes through the [`Backend`] trait. Implementations
//! fold transport and server failures into [`ApiError`] before returning, so
//! the coordination layer only ever sees the normalized taxonomy.
//!
//! The credential is passed explicitly on each call rather than held by the
//! backend; whoever owns the session decides which token is current.
//!
//! # Example
//!
//! ```
//! use libbloom::api::{Backend, mock::MockBackend};
//!
//! # async fn example() -> Result<(), libbloom::error::ApiError> {
//! let backend = MockBackend::new();
//! let grant = backend.register("amy", "hunter2").await?;
//! backend.post_item("Hello #forest", &grant.token).await?;
//!
//! let feed = backend.feed(&grant.token).await?;
//! assert_eq!(feed.len(), 1);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::types::{Item, ItemId, OwnProfile, Profile};

pub mod http;
pub mod mock;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Credential granted by `login` or `register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGrant {
    pub token: String,
}

/// Result of posting a bloom
///
/// The server does not always echo the new id back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReceipt {
    #[serde(default)]
    pub id: Option<ItemId>,
}

/// A who-to-follow entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub username: String,
}

/// Backend API used by the client
///
/// Lists are returned as the server sends them; callers sort for display.
#[async_trait(?Send)]
pub trait Backend {
    /// Exchange credentials for a token
    async fn login(&self, username: &str, password: &str) -> ApiResult<AuthGrant>;

    /// Create an account and log in
    async fn register(&self, username: &str, password: &str) -> ApiResult<AuthGrant>;

    /// Profile of the token's owner
    async fn own_profile(&self, token: &str) -> ApiResult<OwnProfile>;

    /// Public profile of `username`; relationship flags need a token
    async fn profile(&self, username: &str, token: Option<&str>) -> ApiResult<Profile>;

    async fn post_item(&self, content: &str, token: &str) -> ApiResult<PostReceipt>;

    async fn like(&self, id: ItemId, token: &str) -> ApiResult<()>;

    async fn follow(&self, username: &str, token: &str) -> ApiResult<()>;

    /// Own plus followed blooms
    async fn feed(&self, token: &str) -> ApiResult<Vec<Item>>;

    async fn items_by_user(&self, username: &str) -> ApiResult<Vec<Item>>;

    /// Blooms containing `#tag` (tag given without the `#`)
    async fn items_by_hashtag(&self, tag: &str) -> ApiResult<Vec<Item>>;

    async fn item(&self, id: ItemId) -> ApiResult<Item>;

    /// Users the token's owner does not follow yet, excluding themselves
    async fn suggested_follows(&self, limit: usize, token: &str) -> ApiResult<Vec<Suggestion>>;
}
