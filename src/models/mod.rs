//! Database models shared across the CRM repository.

#[cfg(feature = "server")]
pub mod auth;
pub mod client;
#[cfg(feature = "server")]
pub mod config;
pub mod lead;
pub mod task;
pub mod user;
