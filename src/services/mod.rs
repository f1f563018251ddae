//! Business rules. Every function receives the repository and the resolved
//! caller explicitly; routes only translate HTTP to and from these calls.

pub mod access;
pub mod analytics;
pub mod auth;
pub mod clients;
pub mod errors;
pub mod leads;
pub mod tasks;
pub mod users;

pub use errors::{ErrorKind, ServiceError, ServiceResult};
