//! User directory: admin managed accounts and the manager hierarchy.

use std::collections::HashSet;

use validator::Validate;

use crate::domain::types::UserId;
use crate::domain::user::{Role, UpdateUser, User};
use crate::forms::ListQuery;
use crate::forms::users::{AddUserForm, UpdateUserForm};
use crate::pagination::Paginated;
use crate::repository::{UserListQuery, UserReader, UserWriter};
use crate::services::access::{ensure_role, load_user};
use crate::services::auth::hash_password;
use crate::services::{ServiceError, ServiceResult};

/// Fails with `Conflict` when any unique profile field already belongs to a
/// user other than `except`.
fn ensure_unique<R>(
    repo: &R,
    except: Option<UserId>,
    updates: &UpdateUser,
) -> ServiceResult<()>
where
    R: UserReader + ?Sized,
{
    let taken = |found: Option<User>| found.is_some_and(|user| Some(user.id) != except);

    if let Some(username) = &updates.username {
        if taken(repo.get_user_by_username(username)?) {
            return Err(ServiceError::Conflict("username already exists".to_string()));
        }
    }
    if let Some(email) = &updates.email {
        if taken(repo.get_user_by_email(email)?) {
            return Err(ServiceError::Conflict("email already exists".to_string()));
        }
    }
    if let Some(phone) = &updates.phone {
        if taken(repo.get_user_by_phone(phone)?) {
            return Err(ServiceError::Conflict("phone already exists".to_string()));
        }
    }
    Ok(())
}

/// Rejects a manager assignment that would make `user_id` its own
/// (possibly indirect) manager.
fn ensure_acyclic<R>(repo: &R, user_id: UserId, manager: &User) -> ServiceResult<()>
where
    R: UserReader + ?Sized,
{
    if manager.id == user_id {
        return Err(ServiceError::Validation(
            "a user cannot manage themselves".to_string(),
        ));
    }

    let mut visited = HashSet::from([manager.id]);
    let mut next = manager.manager_id;
    while let Some(current) = next {
        if current == user_id {
            return Err(ServiceError::Validation(
                "manager assignment would create a cycle".to_string(),
            ));
        }
        if !visited.insert(current) {
            break;
        }
        next = repo.get_user_by_id(current)?.and_then(|user| user.manager_id);
    }
    Ok(())
}

pub fn add_user<R>(repo: &R, caller: &User, form: &AddUserForm) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(caller, Role::Admin)?;
    form.validate()?;

    let password = form.password()?;
    let mut new_user = form.to_new_user(String::new())?;

    ensure_unique(
        repo,
        None,
        &UpdateUser {
            username: Some(new_user.username.clone()),
            email: Some(new_user.email.clone()),
            phone: Some(new_user.phone.clone()),
            ..UpdateUser::default()
        },
    )?;

    if let Some(manager_id) = new_user.manager_id {
        load_user(repo, manager_id)?;
    }

    new_user.password_hash = hash_password(&password)?;
    repo.create_user(&new_user).map_err(|err| {
        log::error!("Failed to create user: {err}");
        err.into()
    })
}

pub fn update_user<R>(
    repo: &R,
    caller: &User,
    user_id: i32,
    form: &UpdateUserForm,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(caller, Role::Admin)?;
    form.validate()?;
    let updates = form.to_update_user()?;

    let target = load_user(repo, UserId::new(user_id)?)?;

    ensure_unique(repo, Some(target.id), &updates)?;

    if let Some(Some(manager_id)) = updates.manager_id {
        let manager = load_user(repo, manager_id)?;
        ensure_acyclic(repo, target.id, &manager)?;
    }

    if updates.is_empty() {
        return Ok(target);
    }

    repo.update_user(target.id, &updates).map_err(|err| {
        log::error!("Failed to update user {}: {err}", target.id);
        err.into()
    })
}

pub fn delete_user<R>(repo: &R, caller: &User, user_id: i32) -> ServiceResult<()>
where
    R: UserWriter + ?Sized,
{
    ensure_role(caller, Role::Admin)?;
    let user_id = UserId::new(user_id)?;

    repo.delete_user(user_id).map_err(|err| {
        log::error!("Failed to delete user {user_id}: {err}");
        err.into()
    })
}

pub fn get_user<R>(repo: &R, caller: &User, user_id: i32) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    ensure_role(caller, Role::Admin)?;
    load_user(repo, UserId::new(user_id)?)
}

pub fn list_users<R>(repo: &R, caller: &User, query: &ListQuery) -> ServiceResult<Paginated<User>>
where
    R: UserReader + ?Sized,
{
    ensure_role(caller, Role::Admin)?;
    let (page, per_page) = query.paging();
    let (total, users) = repo.list_users(UserListQuery::new().paginate(page, per_page))?;
    Ok(Paginated::new(users, total, page, per_page))
}

/// The caller's direct reports, page by page.
pub fn list_team<R>(repo: &R, caller: &User, query: &ListQuery) -> ServiceResult<Paginated<User>>
where
    R: UserReader + ?Sized,
{
    ensure_role(caller, Role::Manager)?;
    let (page, per_page) = query.paging();
    let (total, users) = repo.list_users(
        UserListQuery::new()
            .reports_of(caller.id)
            .paginate(page, per_page),
    )?;
    Ok(Paginated::new(users, total, page, per_page))
}

/// Every user whose manager is `manager`.
pub fn get_direct_reports<R>(repo: &R, manager: &User) -> ServiceResult<Vec<User>>
where
    R: UserReader + ?Sized,
{
    let (_, users) = repo.list_users(UserListQuery::new().reports_of(manager.id))?;
    Ok(users)
}

pub fn current_profile(caller: &User) -> User {
    caller.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::tests::sample_user;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn admin() -> User {
        sample_user(1, None, &[Role::Admin])
    }

    fn add_form() -> AddUserForm {
        AddUserForm {
            username: "newbie".to_string(),
            email: "newbie@example.com".to_string(),
            phone: "5559990000".to_string(),
            name: "New Bie".to_string(),
            address: "2 Side St".to_string(),
            position: "Rep".to_string(),
            department: "Sales".to_string(),
            password: "password1".to_string(),
            roles: vec!["EMPLOYEE".to_string()],
            manager_id: None,
        }
    }

    #[test]
    fn only_admins_add_users() {
        let mut repo = MockRepository::new();
        repo.expect_create_user().never();
        let caller = sample_user(2, None, &[Role::Manager]);
        assert!(matches!(
            add_user(&repo, &caller, &add_form()),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_username()
            .returning(|_| Ok(Some(sample_user(7, None, &[Role::Employee]))));
        repo.expect_create_user().never();

        assert!(matches!(
            add_user(&repo, &admin(), &add_form()),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn unknown_manager_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_username().returning(|_| Ok(None));
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        repo.expect_get_user_by_phone().returning(|_| Ok(None));
        repo.expect_get_user_by_id().returning(|_| Ok(None));
        repo.expect_create_user().never();

        let mut form = add_form();
        form.manager_id = Some(42);
        assert!(matches!(
            add_user(&repo, &admin(), &form),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn add_user_stores_hashed_password() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_username().returning(|_| Ok(None));
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        repo.expect_get_user_by_phone().returning(|_| Ok(None));
        repo.expect_create_user()
            .withf(|new_user| {
                new_user.password_hash.starts_with("$argon2")
                    && new_user.roles.contains(Role::Employee)
            })
            .times(1)
            .returning(|_| Ok(sample_user(9, None, &[Role::Employee])));

        let user = add_user(&repo, &admin(), &add_form()).unwrap();
        assert_eq!(user.id.get(), 9);
    }

    #[test]
    fn update_email_collision_with_other_user_is_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|id| Ok(Some(sample_user(id.get(), None, &[Role::Employee]))));
        repo.expect_get_user_by_email()
            .returning(|_| Ok(Some(sample_user(8, None, &[Role::Employee]))));
        repo.expect_update_user().never();

        let form = UpdateUserForm {
            email: Some("taken@example.com".to_string()),
            ..UpdateUserForm::default()
        };
        assert!(matches!(
            update_user(&repo, &admin(), 3, &form),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn update_keeps_own_email() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|id| Ok(Some(sample_user(id.get(), None, &[Role::Employee]))));
        repo.expect_get_user_by_email()
            .returning(|_| Ok(Some(sample_user(3, None, &[Role::Employee]))));
        repo.expect_update_user()
            .times(1)
            .returning(|id, _| Ok(sample_user(id.get(), None, &[Role::Employee])));

        let form = UpdateUserForm {
            email: Some("user3@example.com".to_string()),
            ..UpdateUserForm::default()
        };
        assert!(update_user(&repo, &admin(), 3, &form).is_ok());
    }

    #[test]
    fn update_missing_user_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id().returning(|_| Ok(None));
        assert!(matches!(
            update_user(&repo, &admin(), 3, &UpdateUserForm::default()),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn manager_cycles_are_rejected() {
        // 3 reports to 2 which reports to 1; making 1 report to 3 closes a loop.
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id().returning(|id| {
            Ok(Some(match id.get() {
                1 => sample_user(1, None, &[Role::Manager]),
                2 => sample_user(2, Some(1), &[Role::Manager]),
                other => sample_user(other, Some(2), &[Role::Employee]),
            }))
        });
        repo.expect_update_user().never();

        let cyclic = UpdateUserForm {
            manager_id: Some(Some(3)),
            ..UpdateUserForm::default()
        };
        assert!(matches!(
            update_user(&repo, &admin(), 1, &cyclic),
            Err(ServiceError::Validation(_))
        ));

        let own = UpdateUserForm {
            manager_id: Some(Some(2)),
            ..UpdateUserForm::default()
        };
        assert!(matches!(
            update_user(&repo, &admin(), 2, &own),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn delete_with_references_is_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_delete_user()
            .returning(|_| Err(RepositoryError::ConstraintViolation("fk".to_string())));
        assert!(matches!(
            delete_user(&repo, &admin(), 4),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn team_listing_is_scoped_to_reports() {
        let mut repo = MockRepository::new();
        repo.expect_list_users()
            .withf(|query| query.manager_id.map(UserId::get) == Some(2))
            .returning(|_| Ok((1, vec![sample_user(5, Some(2), &[Role::Employee])])));

        let manager = sample_user(2, None, &[Role::Manager]);
        let page = list_team(&repo, &manager, &ListQuery::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].manager_id, Some(manager.id));
    }
}
