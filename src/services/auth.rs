//! Password handling, login and password changes.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use validator::Validate;

use crate::domain::types::PlainPassword;
use crate::domain::user::User;
use crate::dto::auth::SessionData;
use crate::forms::auth::{ChangePasswordForm, LoginForm};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

/// Produces an Argon2 PHC string for `password`.
pub fn hash_password(password: &PlainPassword) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_str().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            log::error!("Failed to hash password: {err}");
            ServiceError::Internal("failed to hash password".to_string())
        })
}

/// False for a wrong password as well as for an unparsable stored hash.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            log::error!("Stored password hash is malformed: {err}");
            false
        }
    }
}

/// Checks the credentials and issues a signed access token.
pub fn login<R>(
    repo: &R,
    form: &LoginForm,
    secret: &str,
    token_ttl_hours: i64,
) -> ServiceResult<SessionData>
where
    R: UserReader + ?Sized,
{
    form.validate()
        .map_err(|_| ServiceError::Unauthenticated)?;
    let username = form.username().map_err(|_| ServiceError::Unauthenticated)?;

    let credentials = repo
        .get_user_credentials(&username)?
        .ok_or(ServiceError::Unauthenticated)?;

    if !verify_password(&form.password, &credentials.password_hash) {
        log::warn!("Failed login attempt for {username}");
        return Err(ServiceError::Unauthenticated);
    }

    let token = AuthenticatedUser::new(&credentials.user, token_ttl_hours)
        .to_jwt(secret)
        .map_err(|err| {
            log::error!("Failed to sign access token: {err}");
            ServiceError::Internal("failed to issue token".to_string())
        })?;

    Ok(SessionData {
        token,
        user: credentials.user,
    })
}

pub fn change_password<R>(repo: &R, caller: &User, form: &ChangePasswordForm) -> ServiceResult<()>
where
    R: UserReader + UserWriter + ?Sized,
{
    form.validate()?;
    let new_password = form.new_password()?;

    let credentials = repo
        .get_user_credentials(&caller.username)?
        .ok_or(ServiceError::Unauthenticated)?;

    if !verify_password(&form.old_password, &credentials.password_hash) {
        return Err(ServiceError::Validation(
            "current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(&new_password)?;
    repo.update_user_password(caller.id, &password_hash)
        .map_err(|err| {
            log::error!("Failed to update password: {err}");
            err
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::tests::sample_user;
    use crate::domain::user::{Role, UserCredentials};
    use crate::repository::mock::MockRepository;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hmac-signing-purposes-0123456789";

    fn repo_with_password(password: &str) -> MockRepository {
        let hash = hash_password(&PlainPassword::new(password).unwrap()).unwrap();
        let mut repo = MockRepository::new();
        repo.expect_get_user_credentials().returning(move |_| {
            Ok(Some(UserCredentials {
                user: sample_user(1, None, &[Role::Employee]),
                password_hash: hash.clone(),
            }))
        });
        repo
    }

    #[test]
    fn hashes_verify_only_the_original_password() {
        let hash = hash_password(&PlainPassword::new("correct horse").unwrap()).unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-hash"));
    }

    #[test]
    fn login_issues_token_for_valid_credentials() {
        let repo = repo_with_password("password1");
        let form = LoginForm {
            username: "user1".to_string(),
            password: "password1".to_string(),
        };

        let session = login(&repo, &form, SECRET, 1).unwrap();
        let claims = AuthenticatedUser::from_jwt(&session.token, SECRET).unwrap();
        assert_eq!(claims.user_id(), Some(session.user.id));
    }

    #[test]
    fn login_rejects_wrong_password() {
        let repo = repo_with_password("password1");
        let form = LoginForm {
            username: "user1".to_string(),
            password: "password2".to_string(),
        };
        assert!(matches!(
            login(&repo, &form, SECRET, 1),
            Err(ServiceError::Unauthenticated)
        ));
    }

    #[test]
    fn change_password_requires_current_password() {
        let mut repo = repo_with_password("password1");
        repo.expect_update_user_password().never();
        let caller = sample_user(1, None, &[Role::Employee]);
        let form = ChangePasswordForm {
            old_password: "nope".to_string(),
            new_password: "new-password".to_string(),
        };
        assert!(matches!(
            change_password(&repo, &caller, &form),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn change_password_stores_new_hash() {
        let mut repo = repo_with_password("password1");
        repo.expect_update_user_password()
            .withf(|id, hash| id.get() == 1 && verify_password("new-password", hash))
            .times(1)
            .returning(|_, _| Ok(()));
        let caller = sample_user(1, None, &[Role::Employee]);
        let form = ChangePasswordForm {
            old_password: "password1".to_string(),
            new_password: "new-password".to_string(),
        };
        change_password(&repo, &caller, &form).unwrap();
    }
}
