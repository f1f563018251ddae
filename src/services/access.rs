//! Caller resolution and the ownership checks shared by every component.

use crate::domain::types::UserId;
use crate::domain::user::{OwnerRelation, Role, User};
use crate::models::auth::AuthenticatedUser;
use crate::repository::UserReader;
use crate::services::{ServiceError, ServiceResult};

/// Loads the user named by a validated token. Tokens for deleted users are
/// treated as unauthenticated.
pub fn load_caller<R>(repo: &R, auth: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    let user_id = auth.user_id().ok_or(ServiceError::Unauthenticated)?;
    repo.get_user_by_id(user_id)?
        .ok_or(ServiceError::Unauthenticated)
}

pub fn ensure_role(caller: &User, role: Role) -> ServiceResult<()> {
    if caller.has_role(role) {
        Ok(())
    } else {
        Err(ServiceError::forbidden())
    }
}

pub fn ensure_any_role(caller: &User, roles: &[Role]) -> ServiceResult<()> {
    if roles.iter().any(|role| caller.has_role(*role)) {
        Ok(())
    } else {
        Err(ServiceError::forbidden())
    }
}

pub fn load_user<R>(repo: &R, user_id: UserId) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    repo.get_user_by_id(user_id)?
        .ok_or_else(|| ServiceError::not_found("user"))
}

/// How `caller` relates to the assignee `owner_id` of some record.
pub fn relation_to<R>(repo: &R, caller: &User, owner_id: UserId) -> ServiceResult<OwnerRelation>
where
    R: UserReader + ?Sized,
{
    if owner_id == caller.id {
        return Ok(OwnerRelation::Owner);
    }
    match repo.get_user_by_id(owner_id)? {
        Some(owner) => Ok(OwnerRelation::of(caller, &owner)),
        None => Ok(OwnerRelation::Unrelated),
    }
}

/// Owner, owner's manager, or admin.
pub fn ensure_can_access<R>(repo: &R, caller: &User, owner_id: UserId) -> ServiceResult<()>
where
    R: UserReader + ?Sized,
{
    if caller.has_role(Role::Admin) || relation_to(repo, caller, owner_id)?.is_owner_or_manager() {
        Ok(())
    } else {
        Err(ServiceError::forbidden())
    }
}

/// Resolves `target_id` and checks that it reports directly to `manager`.
pub fn ensure_direct_report<R>(repo: &R, manager: &User, target_id: UserId) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    let target = load_user(repo, target_id)?;
    if manager.is_manager_of(&target) {
        Ok(target)
    } else {
        Err(ServiceError::Forbidden(
            "assignee is not a direct report".to_string(),
        ))
    }
}
