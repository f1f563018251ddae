use actix_web::{HttpResponse, delete, get, patch, post, web};

use crate::forms::ListQuery;
use crate::forms::users::{AddUserForm, UpdateUserForm};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::caller;
use crate::services::{ServiceError, users as user_service};

#[get("/users")]
pub async fn list_users(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = user_service::list_users(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/users")]
pub async fn add_user(
    user: AuthenticatedUser,
    form: web::Json<AddUserForm>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let created = user_service::add_user(repo.get_ref(), &caller, &form)?;
    Ok(HttpResponse::Created().json(created))
}

#[get("/users/team")]
pub async fn list_team(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = user_service::list_team(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/users/{user_id}")]
pub async fn get_user(
    user: AuthenticatedUser,
    user_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let found = user_service::get_user(repo.get_ref(), &caller, user_id.into_inner())?;
    Ok(HttpResponse::Ok().json(found))
}

#[patch("/users/{user_id}")]
pub async fn update_user(
    user: AuthenticatedUser,
    user_id: web::Path<i32>,
    form: web::Json<UpdateUserForm>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let updated =
        user_service::update_user(repo.get_ref(), &caller, user_id.into_inner(), &form)?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/users/{user_id}")]
pub async fn delete_user(
    user: AuthenticatedUser,
    user_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    user_service::delete_user(repo.get_ref(), &caller, user_id.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}
