//! Lead lifecycle: creation, role-specific updates and the conversion
//! approval hand-off between an employee and their manager.

use chrono::Utc;
use validator::Validate;

use crate::domain::client::Client;
use crate::domain::lead::{ConversionStatus, DEFAULT_DENIAL_MESSAGE, Lead, UpdateLead};
use crate::domain::types::{ConversionMessage, LeadId};
use crate::domain::user::{OwnerRelation, Role, User};
use crate::dto::leads::ConversionOutcome;
use crate::forms::ListQuery;
use crate::forms::leads::{
    AddLeadForm, ConversionDecisionForm, ConversionRequestForm, UpdateLeadForm,
};
use crate::pagination::Paginated;
use crate::repository::{AssigneeFilter, LeadListQuery, LeadReader, LeadWriter, UserReader};
use crate::services::access::{
    ensure_any_role, ensure_can_access, ensure_direct_report, ensure_role, load_user, relation_to,
};
use crate::services::{ServiceError, ServiceResult};

fn load_lead<R>(repo: &R, lead_id: i32) -> ServiceResult<Lead>
where
    R: LeadReader + ?Sized,
{
    repo.get_lead_by_id(LeadId::new(lead_id)?)?
        .ok_or_else(|| ServiceError::not_found("lead"))
}

/// Replaces the lead with an `ACTIVE` client for the same assignee.
fn convert<R>(repo: &R, lead: &Lead, caller: &User) -> ServiceResult<Client>
where
    R: LeadWriter + ?Sized,
{
    let client = repo
        .convert_lead(lead.id, &lead.to_new_client(Utc::now().naive_utc()))
        .map_err(|err| {
            log::error!("Failed to convert lead {}: {err}", lead.id);
            err
        })?;
    log::info!(
        "Lead {} converted to client {} by user {}",
        lead.id,
        client.id,
        caller.id
    );
    Ok(client)
}

fn paginated<R>(
    repo: &R,
    query: LeadListQuery,
    list_query: &ListQuery,
) -> ServiceResult<Paginated<Lead>>
where
    R: LeadReader + ?Sized,
{
    let (page, per_page) = list_query.paging();
    let mut query = query.paginate(page, per_page);
    if let Some(status) = list_query.status_filter()? {
        query = query.status(status);
    }
    let (total, leads) = repo.list_leads(query)?;
    Ok(Paginated::new(leads, total, page, per_page))
}

pub fn create_lead<R>(repo: &R, caller: &User, form: &AddLeadForm) -> ServiceResult<Lead>
where
    R: UserReader + LeadWriter + ?Sized,
{
    ensure_any_role(caller, &[Role::Employee, Role::Manager])?;
    form.validate()?;

    let assignee = match form.requested_assignee()? {
        Some(requested) if caller.has_role(Role::Manager) && requested != caller.id => {
            ensure_direct_report(repo, caller, requested)?.id
        }
        _ => caller.id,
    };

    let new_lead = form.to_new_lead(assignee, caller.id, Utc::now().naive_utc())?;
    repo.create_lead(&new_lead).map_err(|err| {
        log::error!("Failed to create lead: {err}");
        err.into()
    })
}

/// Admins and the responsible manager convert straight away; the owning
/// employee only marks the lead as waiting for approval.
pub fn request_conversion<R>(
    repo: &R,
    caller: &User,
    lead_id: i32,
    form: &ConversionRequestForm,
) -> ServiceResult<ConversionOutcome>
where
    R: UserReader + LeadReader + LeadWriter + ?Sized,
{
    let message = form.message()?;
    let lead = load_lead(repo, lead_id)?;

    if caller.has_role(Role::Admin) {
        return convert(repo, &lead, caller).map(ConversionOutcome::Converted);
    }

    let relation = relation_to(repo, caller, lead.assigned_to)?;
    if caller.has_role(Role::Manager) && relation.is_owner_or_manager() {
        return convert(repo, &lead, caller).map(ConversionOutcome::Converted);
    }

    if relation != OwnerRelation::Owner {
        return Err(ServiceError::forbidden());
    }

    let updates = UpdateLead::conversion(ConversionStatus::Pending, message, Utc::now().naive_utc());
    let lead = repo.update_lead(lead.id, &updates)?;
    log::info!("User {} requested conversion of lead {}", caller.id, lead.id);
    Ok(ConversionOutcome::Pending(lead))
}

pub fn approve_conversion<R>(
    repo: &R,
    caller: &User,
    lead_id: i32,
    form: &ConversionDecisionForm,
) -> ServiceResult<ConversionOutcome>
where
    R: UserReader + LeadReader + LeadWriter + ?Sized,
{
    ensure_role(caller, Role::Manager)?;
    let message = form.message()?;
    let lead = load_lead(repo, lead_id)?;

    if !relation_to(repo, caller, lead.assigned_to)?.is_owner_or_manager() {
        return Err(ServiceError::forbidden());
    }
    if !lead.is_pending_conversion() {
        return Err(ServiceError::Validation(
            "lead has no pending conversion request".to_string(),
        ));
    }

    if form.approve {
        return convert(repo, &lead, caller).map(ConversionOutcome::Converted);
    }

    let message = match message {
        Some(message) => message,
        None => ConversionMessage::new(DEFAULT_DENIAL_MESSAGE)?,
    };
    let updates = UpdateLead::conversion(
        ConversionStatus::Denied,
        Some(message),
        Utc::now().naive_utc(),
    );
    let lead = repo.update_lead(lead.id, &updates)?;
    log::info!("Conversion of lead {} denied by user {}", lead.id, caller.id);
    Ok(ConversionOutcome::Denied(lead))
}

/// Owner only; the assignee cannot change.
pub fn update_lead_as_employee<R>(
    repo: &R,
    caller: &User,
    lead_id: i32,
    form: &UpdateLeadForm,
) -> ServiceResult<Lead>
where
    R: LeadReader + LeadWriter + ?Sized,
{
    form.validate()?;
    let lead = load_lead(repo, lead_id)?;
    if lead.assigned_to != caller.id {
        return Err(ServiceError::forbidden());
    }

    let mut updates = form.to_update_lead(Utc::now().naive_utc())?;
    match updates.assigned_to {
        Some(assignee) if assignee != caller.id => {
            return Err(ServiceError::Forbidden(
                "employees cannot reassign leads".to_string(),
            ));
        }
        _ => updates.assigned_to = None,
    }

    Ok(repo.update_lead(lead.id, &updates)?)
}

/// Owner or owner's manager; reassignment only to the caller's reports.
pub fn update_lead_as_manager<R>(
    repo: &R,
    caller: &User,
    lead_id: i32,
    form: &UpdateLeadForm,
) -> ServiceResult<Lead>
where
    R: UserReader + LeadReader + LeadWriter + ?Sized,
{
    form.validate()?;
    let lead = load_lead(repo, lead_id)?;
    if !relation_to(repo, caller, lead.assigned_to)?.is_owner_or_manager() {
        return Err(ServiceError::forbidden());
    }

    let mut updates = form.to_update_lead(Utc::now().naive_utc())?;
    match updates.assigned_to {
        Some(assignee) if assignee == lead.assigned_to => updates.assigned_to = None,
        Some(assignee) => {
            ensure_direct_report(repo, caller, assignee)?;
        }
        None => {}
    }

    Ok(repo.update_lead(lead.id, &updates)?)
}

/// No ownership check; any existing user may become the assignee.
pub fn update_lead_as_admin<R>(
    repo: &R,
    lead_id: i32,
    form: &UpdateLeadForm,
) -> ServiceResult<Lead>
where
    R: UserReader + LeadReader + LeadWriter + ?Sized,
{
    form.validate()?;
    let lead = load_lead(repo, lead_id)?;

    let updates = form.to_update_lead(Utc::now().naive_utc())?;
    if let Some(assignee) = updates.assigned_to {
        load_user(repo, assignee)?;
    }

    Ok(repo.update_lead(lead.id, &updates)?)
}

/// Applies the update variant matching the caller's most privileged role.
pub fn update_lead<R>(
    repo: &R,
    caller: &User,
    lead_id: i32,
    form: &UpdateLeadForm,
) -> ServiceResult<Lead>
where
    R: UserReader + LeadReader + LeadWriter + ?Sized,
{
    if caller.has_role(Role::Admin) {
        update_lead_as_admin(repo, lead_id, form)
    } else if caller.has_role(Role::Manager) {
        update_lead_as_manager(repo, caller, lead_id, form)
    } else if caller.has_role(Role::Employee) {
        update_lead_as_employee(repo, caller, lead_id, form)
    } else {
        Err(ServiceError::forbidden())
    }
}

pub fn delete_lead<R>(repo: &R, caller: &User, lead_id: i32) -> ServiceResult<()>
where
    R: UserReader + LeadReader + LeadWriter + ?Sized,
{
    let lead = load_lead(repo, lead_id)?;
    ensure_can_access(repo, caller, lead.assigned_to)?;
    repo.delete_lead(lead.id).map_err(|err| {
        log::error!("Failed to delete lead {}: {err}", lead.id);
        err.into()
    })
}

pub fn get_lead<R>(repo: &R, caller: &User, lead_id: i32) -> ServiceResult<Lead>
where
    R: UserReader + LeadReader + ?Sized,
{
    let lead = load_lead(repo, lead_id)?;
    ensure_can_access(repo, caller, lead.assigned_to)?;
    Ok(lead)
}

pub fn list_mine<R>(repo: &R, caller: &User, query: &ListQuery) -> ServiceResult<Paginated<Lead>>
where
    R: LeadReader + ?Sized,
{
    paginated(
        repo,
        LeadListQuery::new(AssigneeFilter::User(caller.id)),
        query,
    )
}

/// Leads of every direct report of the caller.
pub fn list_for_manager<R>(
    repo: &R,
    caller: &User,
    query: &ListQuery,
) -> ServiceResult<Paginated<Lead>>
where
    R: LeadReader + ?Sized,
{
    ensure_role(caller, Role::Manager)?;
    paginated(
        repo,
        LeadListQuery::new(AssigneeFilter::ReportsOf(caller.id)),
        query,
    )
}

/// Direct reports' leads waiting for the caller's decision.
pub fn list_pending_for_manager<R>(
    repo: &R,
    caller: &User,
    query: &ListQuery,
) -> ServiceResult<Paginated<Lead>>
where
    R: LeadReader + ?Sized,
{
    ensure_role(caller, Role::Manager)?;
    paginated(
        repo,
        LeadListQuery::new(AssigneeFilter::ReportsOf(caller.id))
            .conversion_status(ConversionStatus::Pending),
        query,
    )
}

pub fn list_all<R>(repo: &R, caller: &User, query: &ListQuery) -> ServiceResult<Paginated<Lead>>
where
    R: LeadReader + ?Sized,
{
    ensure_role(caller, Role::Admin)?;
    paginated(repo, LeadListQuery::new(AssigneeFilter::Everyone), query)
}
