use actix_web::{HttpResponse, delete, get, patch, post, web};

use crate::forms::ListQuery;
use crate::forms::leads::{
    AddLeadForm, ConversionDecisionForm, ConversionRequestForm, UpdateLeadForm,
};
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::caller;
use crate::services::{ServiceError, leads as lead_service};

#[get("/leads")]
pub async fn list_mine(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = lead_service::list_mine(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/leads")]
pub async fn create_lead(
    user: AuthenticatedUser,
    form: web::Json<AddLeadForm>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let lead = lead_service::create_lead(repo.get_ref(), &caller, &form)?;
    Ok(HttpResponse::Created().json(lead))
}

#[get("/leads/team")]
pub async fn list_for_manager(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = lead_service::list_for_manager(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/leads/pending")]
pub async fn list_pending(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = lead_service::list_pending_for_manager(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/leads/all")]
pub async fn list_all(
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let page = lead_service::list_all(repo.get_ref(), &caller, &query)?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/leads/{lead_id}")]
pub async fn get_lead(
    user: AuthenticatedUser,
    lead_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let lead = lead_service::get_lead(repo.get_ref(), &caller, lead_id.into_inner())?;
    Ok(HttpResponse::Ok().json(lead))
}

#[patch("/leads/{lead_id}")]
pub async fn update_lead(
    user: AuthenticatedUser,
    lead_id: web::Path<i32>,
    form: web::Json<UpdateLeadForm>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let lead = lead_service::update_lead(repo.get_ref(), &caller, lead_id.into_inner(), &form)?;
    Ok(HttpResponse::Ok().json(lead))
}

#[delete("/leads/{lead_id}")]
pub async fn delete_lead(
    user: AuthenticatedUser,
    lead_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    lead_service::delete_lead(repo.get_ref(), &caller, lead_id.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/leads/{lead_id}/conversion")]
pub async fn request_conversion(
    user: AuthenticatedUser,
    lead_id: web::Path<i32>,
    form: Option<web::Json<ConversionRequestForm>>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let form = form.map(web::Json::into_inner).unwrap_or_default();
    let outcome =
        lead_service::request_conversion(repo.get_ref(), &caller, lead_id.into_inner(), &form)?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/leads/{lead_id}/conversion/decision")]
pub async fn decide_conversion(
    user: AuthenticatedUser,
    lead_id: web::Path<i32>,
    form: web::Json<ConversionDecisionForm>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let caller = caller(&repo, &user)?;
    let outcome =
        lead_service::approve_conversion(repo.get_ref(), &caller, lead_id.into_inner(), &form)?;
    Ok(HttpResponse::Ok().json(outcome))
}
