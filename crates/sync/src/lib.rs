//! Client-side synchronization engine for the FTI finance dashboard.
//!
//! The engine keeps server-confirmed state (dashboard snapshot, goals,
//! alerts, alert preferences) in sync with the REST API and never edits it
//! locally. Writes go through the [`mutator`], which always re-reads state
//! after a successful call.

pub mod alerts;
pub mod auth;
pub mod categories;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod goals;
pub mod mutator;
pub mod presenter;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod slot;
pub mod store;

pub use error::{Error, Result};
