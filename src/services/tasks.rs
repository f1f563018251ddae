//! Task lifecycle.

use chrono::{NaiveDateTime, Utc};
use validator::Validate;

use crate::domain::task::{Task, TaskWithLead, UpdateTask, is_valid_due_date};
use crate::domain::types::{LeadId, TaskId};
use crate::domain::user::{Role, User};
use crate::forms::ListQuery;
use crate::forms::tasks::{AddTaskForm, UpdateTaskForm};
use crate::pagination::Paginated;
use crate::repository::{AssigneeFilter, LeadReader, TaskListQuery, TaskReader, TaskWriter, UserReader};
use crate::services::access::{
    ensure_any_role, ensure_can_access, ensure_direct_report, ensure_role, load_user, relation_to,
};
use crate::services::{ServiceError, ServiceResult};

fn load_task<R>(repo: &R, task_id: i32) -> ServiceResult<Task>
where
    R: TaskReader + ?Sized,
{
    repo.get_task_by_id(TaskId::new(task_id)?)?
        .ok_or_else(|| ServiceError::not_found("task"))
}

fn ensure_due_date(due_date: Option<NaiveDateTime>, now: NaiveDateTime) -> ServiceResult<()> {
    match due_date {
        Some(due_date) if !is_valid_due_date(due_date, now) => Err(ServiceError::Validation(
            "due date must be in the future".to_string(),
        )),
        _ => Ok(()),
    }
}

fn ensure_lead_exists<R>(repo: &R, lead_id: Option<LeadId>) -> ServiceResult<()>
where
    R: LeadReader + ?Sized,
{
    if let Some(lead_id) = lead_id {
        repo.get_lead_by_id(lead_id)?
            .ok_or_else(|| ServiceError::not_found("lead"))?;
    }
    Ok(())
}

/// Field changes shared by every update variant, after the due-date and
/// lead-link checks.
fn checked_updates<R>(repo: &R, form: &UpdateTaskForm) -> ServiceResult<UpdateTask>
where
    R: LeadReader + ?Sized,
{
    form.validate()?;
    let now = Utc::now().naive_utc();
    ensure_due_date(form.new_due_date(), now)?;
    ensure_lead_exists(repo, form.new_lead_id()?)?;
    Ok(form.to_update_task(now)?)
}

fn paginated<R>(
    repo: &R,
    query: TaskListQuery,
    list_query: &ListQuery,
) -> ServiceResult<Paginated<TaskWithLead>>
where
    R: TaskReader + ?Sized,
{
    let (page, per_page) = list_query.paging();
    let mut query = query.paginate(page, per_page);
    if let Some(status) = list_query.status_filter()? {
        query = query.status(status);
    }
    let (total, tasks) = repo.list_tasks(query)?;
    Ok(Paginated::new(tasks, total, page, per_page))
}

pub fn create_task<R>(repo: &R, caller: &User, form: &AddTaskForm) -> ServiceResult<Task>
where
    R: UserReader + LeadReader + TaskWriter + ?Sized,
{
    ensure_any_role(caller, &[Role::Employee, Role::Manager])?;
    form.validate()?;

    let now = Utc::now().naive_utc();
    ensure_lead_exists(repo, form.lead_id()?)?;
    ensure_due_date(form.due_date, now)?;

    let assignee = match form.requested_assignee()? {
        None => caller.id,
        Some(requested) if requested == caller.id => caller.id,
        Some(requested) => ensure_direct_report(repo, caller, requested)?.id,
    };

    let new_task = form.to_new_task(assignee, caller.id, now)?;
    repo.create_task(&new_task).map_err(|err| {
        log::error!("Failed to create task: {err}");
        err.into()
    })
}

/// Owner only. Supplying anyone but the caller as assignee is rejected.
pub fn update_task_as_employee<R>(
    repo: &R,
    caller: &User,
    task_id: i32,
    form: &UpdateTaskForm,
) -> ServiceResult<Task>
where
    R: LeadReader + TaskReader + TaskWriter + ?Sized,
{
    let task = load_task(repo, task_id)?;
    if task.assigned_to != caller.id {
        return Err(ServiceError::forbidden());
    }
    if form
        .requested_assignee()?
        .is_some_and(|assignee| assignee != caller.id)
    {
        return Err(ServiceError::Forbidden(
            "employees cannot reassign tasks".to_string(),
        ));
    }

    let updates = checked_updates(repo, form)?;
    Ok(repo.update_task(task.id, &updates)?)
}

/// Owner or owner's manager. Reassignment targets the caller or one of their
/// reports, and the assigner is always recorded.
pub fn update_task_as_manager<R>(
    repo: &R,
    caller: &User,
    task_id: i32,
    form: &UpdateTaskForm,
) -> ServiceResult<Task>
where
    R: UserReader + LeadReader + TaskReader + TaskWriter + ?Sized,
{
    let task = load_task(repo, task_id)?;
    if !relation_to(repo, caller, task.assigned_to)?.is_owner_or_manager() {
        return Err(ServiceError::forbidden());
    }

    let assigned_to = match form.requested_assignee()? {
        Some(assignee) if assignee != caller.id => {
            Some(ensure_direct_report(repo, caller, assignee)?.id)
        }
        other => other,
    };
    let assigned_by = match form.requested_assigner()? {
        Some(assigner) => load_user(repo, assigner)?.id,
        None => caller.id,
    };

    let updates = UpdateTask {
        assigned_to,
        assigned_by: Some(assigned_by),
        ..checked_updates(repo, form)?
    };
    Ok(repo.update_task(task.id, &updates)?)
}

/// No ownership check; assignee and assigner must be existing users.
pub fn update_task_as_admin<R>(repo: &R, task_id: i32, form: &UpdateTaskForm) -> ServiceResult<Task>
where
    R: UserReader + LeadReader + TaskReader + TaskWriter + ?Sized,
{
    let task = load_task(repo, task_id)?;

    let assigned_to = form
        .requested_assignee()?
        .map(|assignee| load_user(repo, assignee).map(|user| user.id))
        .transpose()?;
    let assigned_by = form
        .requested_assigner()?
        .map(|assigner| load_user(repo, assigner).map(|user| user.id))
        .transpose()?;

    let updates = UpdateTask {
        assigned_to,
        assigned_by,
        ..checked_updates(repo, form)?
    };
    Ok(repo.update_task(task.id, &updates)?)
}

/// Applies the update variant matching the caller's most privileged role.
pub fn update_task<R>(
    repo: &R,
    caller: &User,
    task_id: i32,
    form: &UpdateTaskForm,
) -> ServiceResult<Task>
where
    R: UserReader + LeadReader + TaskReader + TaskWriter + ?Sized,
{
    if caller.has_role(Role::Admin) {
        update_task_as_admin(repo, task_id, form)
    } else if caller.has_role(Role::Manager) {
        update_task_as_manager(repo, caller, task_id, form)
    } else if caller.has_role(Role::Employee) {
        update_task_as_employee(repo, caller, task_id, form)
    } else {
        Err(ServiceError::forbidden())
    }
}

pub fn delete_task<R>(repo: &R, caller: &User, task_id: i32) -> ServiceResult<()>
where
    R: UserReader + TaskReader + TaskWriter + ?Sized,
{
    let task = load_task(repo, task_id)?;
    ensure_can_access(repo, caller, task.assigned_to)?;
    repo.delete_task(task.id).map_err(|err| {
        log::error!("Failed to delete task {}: {err}", task.id);
        err.into()
    })
}

pub fn get_task<R>(repo: &R, caller: &User, task_id: i32) -> ServiceResult<Task>
where
    R: UserReader + TaskReader + ?Sized,
{
    let task = load_task(repo, task_id)?;
    ensure_can_access(repo, caller, task.assigned_to)?;
    Ok(task)
}

pub fn list_mine<R>(
    repo: &R,
    caller: &User,
    query: &ListQuery,
) -> ServiceResult<Paginated<TaskWithLead>>
where
    R: TaskReader + ?Sized,
{
    paginated(
        repo,
        TaskListQuery::new(AssigneeFilter::User(caller.id)),
        query,
    )
}

pub fn list_for_manager<R>(
    repo: &R,
    caller: &User,
    query: &ListQuery,
) -> ServiceResult<Paginated<TaskWithLead>>
where
    R: TaskReader + ?Sized,
{
    ensure_role(caller, Role::Manager)?;
    paginated(
        repo,
        TaskListQuery::new(AssigneeFilter::ReportsOf(caller.id)),
        query,
    )
}

pub fn list_all<R>(
    repo: &R,
    caller: &User,
    query: &ListQuery,
) -> ServiceResult<Paginated<TaskWithLead>>
where
    R: TaskReader + ?Sized,
{
    ensure_role(caller, Role::Admin)?;
    paginated(repo, TaskListQuery::new(AssigneeFilter::Everyone), query)
}
