//! Response payloads produced by services and serialised by routes.

pub mod auth;
pub mod leads;
