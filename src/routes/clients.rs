use actix_web::{HttpResponse, delete, get, patch, web};

use crate::forms::ListQuery;
use crate::forms::clients::UpdateClientForm;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::caller;
use crate::services::{ServiceError, clients as client_service};

#[get("/clients")]
pub async fn list_own(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = client_service::list_own(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/clients/team")]
pub async fn list_for_manager_team(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = client_service::list_for_manager_team(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/clients/all")]
pub async fn list_all(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = client_service::list_all(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[patch("/clients/{client_id}")]
pub async fn update_client(
    user: AuthenticatedUser,
    client_id: web::Path<i32>,
    form: web::Json<UpdateClientForm>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let client =
        client_service::update_client(repo.get_ref(), &caller, client_id.into_inner(), &form)?;
    Ok(HttpResponse::Ok().json(client))
}

#[delete("/clients/{client_id}")]
pub async fn delete_client(
    user: AuthenticatedUser,
    client_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    client_service::delete_client(repo.get_ref(), &caller, client_id.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}
