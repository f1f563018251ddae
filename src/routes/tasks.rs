use actix_web::{HttpResponse, delete, get, patch, post, web};

use crate::forms::ListQuery;
use crate::forms::tasks::{AddTaskForm, UpdateTaskForm};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::caller;
use crate::services::{ServiceError, tasks as task_service};

#[get("/tasks")]
pub async fn list_mine(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = task_service::list_mine(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/tasks")]
pub async fn create_task(
    user: AuthenticatedUser,
    form: web::Json<AddTaskForm>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let task = task_service::create_task(repo.get_ref(), &caller, &form)?;
    Ok(HttpResponse::Created().json(task))
}

#[get("/tasks/team")]
pub async fn list_for_manager(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = task_service::list_for_manager(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/tasks/all")]
pub async fn list_all(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = task_service::list_all(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/tasks/{task_id}")]
pub async fn get_task(
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let task = task_service::get_task(repo.get_ref(), &caller, task_id.into_inner())?;
    Ok(HttpResponse::Ok().json(task))
}

#[patch("/tasks/{task_id}")]
pub async fn update_task(
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
    form: web::Json<UpdateTaskForm>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let task = task_service::update_task(repo.get_ref(), &caller, task_id.into_inner(), &form)?;
    Ok(HttpResponse::Ok().json(task))
}

#[delete("/tasks/{task_id}")]
pub async fn delete_task(
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    task_service::delete_task(repo.get_ref(), &caller, task_id.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}
