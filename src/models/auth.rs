//! Access-token claims and the request extractor that validates them.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::types::UserId;
use crate::domain::user::User;
use crate::models::config::ServerConfig;
use crate::services::errors::ServiceError;

/// Claims carried by a signed access token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    /// User id as a decimal string.
    pub sub: String,
    pub username: String,
    pub roles: Vec<String>,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

impl AuthenticatedUser {
    pub fn new(user: &User, ttl_hours: i64) -> Self {
        Self {
            sub: user.id.to_string(),
            username: user.username.to_string(),
            roles: user.roles.names(),
            exp: (Utc::now() + Duration::hours(ttl_hours)).timestamp(),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.sub
            .parse::<i32>()
            .ok()
            .and_then(|id| UserId::new(id).ok())
    }

    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Decodes and validates the signature and expiry of `token`.
    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
        .map(|token| token.trim().to_string())
}

fn extract(req: &HttpRequest) -> Result<AuthenticatedUser, ServiceError> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ServiceError::Internal("server configuration missing".to_string()))?;

    let token = bearer_token(req)
        .or_else(|| req.get_identity().ok().and_then(|identity| identity.id().ok()))
        .ok_or(ServiceError::Unauthenticated)?;

    AuthenticatedUser::from_jwt(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected access token: {err}");
        ServiceError::Unauthenticated
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::Role;
    use crate::domain::user::tests::sample_user;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hmac-signing-purposes-0123456789";

    #[test]
    fn token_round_trip_keeps_identity() {
        let user = sample_user(5, None, &[Role::Manager, Role::Employee]);
        let claims = AuthenticatedUser::new(&user, 1);
        let token = claims.to_jwt(SECRET).unwrap();

        let decoded = AuthenticatedUser::from_jwt(&token, SECRET).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.user_id(), Some(user.id));
        assert_eq!(decoded.roles, vec!["EMPLOYEE", "MANAGER"]);
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let user = sample_user(5, None, &[Role::Employee]);
        let expired = AuthenticatedUser::new(&user, -2).to_jwt(SECRET).unwrap();
        assert!(AuthenticatedUser::from_jwt(&expired, SECRET).is_err());

        let valid = AuthenticatedUser::new(&user, 1).to_jwt(SECRET).unwrap();
        assert!(AuthenticatedUser::from_jwt(&valid, "another-secret").is_err());
    }
}
