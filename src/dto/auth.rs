use serde::Serialize;

use crate::domain::user::User;

/// Issued on successful login.
#[derive(Debug, Serialize)]
pub struct SessionData {
    /// Signed access token, also usable as a bearer token.
    pub token: String,
    pub user: User,
}
