//! Clients for the hosted backend: table REST API, object storage and
//! password sign-in. Each implements the matching trait from
//! `dairy_cms_core`.

pub mod auth;
pub mod client;
pub mod rest;
pub mod storage;

pub use auth::RemoteAuth;
pub use client::RemoteClient;
pub use rest::RestStore;
pub use storage::RemoteStorage;
