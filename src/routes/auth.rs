use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, get, post, web};

use crate::forms::auth::{ChangePasswordForm, LoginForm};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::caller;
use crate::services::users::current_profile;
use crate::services::{ServiceError, auth as auth_service};

#[post("/auth/login")]
pub async fn login(
    req: HttpRequest,
    form: web::Json<LoginForm>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServiceError> {
    let session = auth_service::login(
        repo.get_ref(),
        &form,
        &server_config.secret,
        server_config.token_ttl_hours,
    )?;

    Identity::login(&req.extensions(), session.token.clone()).map_err(|err| {
        log::error!("Failed to store identity: {err}");
        ServiceError::Internal("failed to start session".to_string())
    })?;

    Ok(HttpResponse::Ok().json(session))
}

#[post("/auth/logout")]
pub async fn logout(identity: Option<Identity>) -> HttpResponse {
    if let Some(identity) = identity {
        identity.logout();
    }
    HttpResponse::NoContent().finish()
}

#[get("/auth/me")]
pub async fn me(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    Ok(HttpResponse::Ok().json(current_profile(&caller)))
}

#[post("/auth/password")]
pub async fn change_password(
    user: AuthenticatedUser,
    form: web::Json<ChangePasswordForm>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    auth_service::change_password(repo.get_ref(), &caller, &form)?;
    Ok(HttpResponse::NoContent().finish())
}
