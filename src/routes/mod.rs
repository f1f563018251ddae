//! actix-web handlers. Each handler resolves the caller, delegates to a
//! service function and serialises the result as JSON.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use serde::Serialize;

use crate::domain::user::User;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::services::access::load_caller;
use crate::services::{ErrorKind, ServiceError, ServiceResult};

pub mod analytics;
pub mod auth;
pub mod clients;
pub mod leads;
pub mod tasks;
pub mod users;

#[derive(Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    message: String,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ServiceError::Internal(details) => {
                log::error!("Request failed: {details}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            kind: self.kind(),
            message,
        })
    }
}

/// Loads the `User` behind the request's access token.
pub(crate) fn caller(repo: &DieselRepository, user: &AuthenticatedUser) -> ServiceResult<User> {
    load_caller(repo, user)
}

/// Registers every handler. Static paths come before `{id}` paths so that
/// e.g. `/leads/pending` is not parsed as an id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ServiceError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ServiceError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ServiceError::Validation(err.to_string()).into()),
    )
    .service(auth::login)
    .service(auth::logout)
    .service(auth::me)
    .service(auth::change_password)
    .service(users::list_users)
    .service(users::add_user)
    .service(users::list_team)
    .service(users::get_user)
    .service(users::update_user)
    .service(users::delete_user)
    .service(leads::list_mine)
    .service(leads::create_lead)
    .service(leads::list_for_manager)
    .service(leads::list_pending)
    .service(leads::list_all)
    .service(leads::get_lead)
    .service(leads::update_lead)
    .service(leads::delete_lead)
    .service(leads::request_conversion)
    .service(leads::decide_conversion)
    .service(tasks::list_mine)
    .service(tasks::create_task)
    .service(tasks::list_for_manager)
    .service(tasks::list_all)
    .service(tasks::get_task)
    .service(tasks::update_task)
    .service(tasks::delete_task)
    .service(clients::list_own)
    .service(clients::list_for_manager_team)
    .service(clients::list_all)
    .service(clients::update_client)
    .service(clients::delete_client)
    .service(analytics::dashboard)
    .service(analytics::employee_summary)
    .service(analytics::manager_summary)
    .service(analytics::admin_summary);
}
