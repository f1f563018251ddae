use actix_web::{HttpResponse, get, web};

use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::caller;
use crate::services::{ServiceError, analytics as analytics_service};

#[get("/dashboard")]
pub async fn dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let dashboard = analytics_service::dashboard(repo.get_ref(), &caller)?;
    Ok(HttpResponse::Ok().json(dashboard))
}

#[get("/analytics/summary")]
pub async fn employee_summary(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let summary = analytics_service::employee_summary(repo.get_ref(), &caller)?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/analytics/manager")]
pub async fn manager_summary(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let summary = analytics_service::manager_summary(repo.get_ref(), &caller)?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/analytics/admin")]
pub async fn admin_summary(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let summary = analytics_service::admin_summary(repo.get_ref(), &caller)?;
    Ok(HttpResponse::Ok().json(summary))
}
