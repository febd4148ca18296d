//! Bloom - client-side coordination for the Purple Forest feed
//!
//! This library keeps a single source of truth for client state, routes
//! addresses to views, and drives independently defined UI units through an
//! explicit lifecycle, fetching data from the backend as views require it.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod presentation;
pub mod router;
pub mod service;
pub mod state;
pub mod types;
pub mod units;
pub mod view;

// Re-export commonly used types
pub use app::App;
pub use config::Config;
pub use error::{BloomError, Result};
pub use presentation::{Document, DomEvent, Presenter};
pub use router::{MemoryHistory, Router};
pub use state::{AppState, StatePatch, StateStore};
pub use types::{Item, ItemId, Profile, Session, UserRef, View};
pub use units::{ActivationState, UnitId, UnitKind};
