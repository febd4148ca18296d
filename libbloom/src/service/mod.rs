//! Service layer for the bloom client
//!
//! - `events`: the typed, synchronous Event Bus
//! - `loader`: fenced backend fetches merged into the State Store
//! - `session`: durable session storage
//! - `validation`: client-side checks run before any backend call

pub mod events;
pub mod loader;
pub mod session;
pub mod validation;

pub use events::{Event, EventBus, EventKind, SubscriptionHandle};
pub use loader::{Loader, RequestFence};
