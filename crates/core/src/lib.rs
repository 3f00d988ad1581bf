//! Content model and admin workflow for the dairy brand site.
//!
//! Rows travel as JSON objects keyed by column name; the [`schema`] module
//! describes which columns each entity has and how they are validated.

pub mod active;
pub mod auth;
pub mod form;
pub mod locale;
pub mod localized;
pub mod media;
pub mod notify;
pub mod schema;
pub mod storage;
pub mod store;
pub mod view;

/// A table row as exchanged with the remote store.
pub type Row = serde_json::Map<String, serde_json::Value>;
