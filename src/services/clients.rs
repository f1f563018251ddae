//! Client registry: role-scoped listings and manager maintenance.

use validator::Validate;

use crate::domain::client::{Client, UpdateClient};
use crate::domain::types::ClientId;
use crate::domain::user::{Role, User};
use crate::forms::ListQuery;
use crate::forms::clients::UpdateClientForm;
use crate::pagination::Paginated;
use crate::repository::{AssigneeFilter, ClientListQuery, ClientReader, ClientWriter, UserReader};
use crate::services::access::{ensure_role, relation_to};
use crate::services::{ServiceError, ServiceResult};

fn paginated<R>(
    repo: &R,
    query: ClientListQuery,
    list_query: &ListQuery,
) -> ServiceResult<Paginated<Client>>
where
    R: ClientReader + ?Sized,
{
    let (page, per_page) = list_query.paging();
    let mut query = query.paginate(page, per_page);
    if let Some(status) = list_query.status_filter()? {
        query = query.status(status);
    }
    let (total, clients) = repo.list_clients(query)?;
    Ok(Paginated::new(clients, total, page, per_page))
}

/// Loads the client a manager wants to change and checks they own it or
/// manage its owner.
fn load_managed_client<R>(repo: &R, caller: &User, client_id: i32) -> ServiceResult<Client>
where
    R: UserReader + ClientReader + ?Sized,
{
    ensure_role(caller, Role::Manager)?;
    let client = repo
        .get_client_by_id(ClientId::new(client_id)?)?
        .ok_or_else(|| ServiceError::not_found("client"))?;
    if !relation_to(repo, caller, client.assigned_to)?.is_owner_or_manager() {
        return Err(ServiceError::forbidden());
    }
    Ok(client)
}

pub fn list_own<R>(repo: &R, caller: &User, query: &ListQuery) -> ServiceResult<Paginated<Client>>
where
    R: ClientReader + ?Sized,
{
    paginated(
        repo,
        ClientListQuery::new(AssigneeFilter::User(caller.id)),
        query,
    )
}

/// Clients assigned to the caller's direct reports.
pub fn list_for_manager_team<R>(
    repo: &R,
    caller: &User,
    query: &ListQuery,
) -> ServiceResult<Paginated<Client>>
where
    R: ClientReader + ?Sized,
{
    ensure_role(caller, Role::Manager)?;
    paginated(
        repo,
        ClientListQuery::new(AssigneeFilter::ReportsOf(caller.id)),
        query,
    )
}

pub fn list_all<R>(repo: &R, caller: &User, query: &ListQuery) -> ServiceResult<Paginated<Client>>
where
    R: ClientReader + ?Sized,
{
    ensure_role(caller, Role::Admin)?;
    paginated(repo, ClientListQuery::new(AssigneeFilter::Everyone), query)
}

pub fn update_client<R>(
    repo: &R,
    caller: &User,
    client_id: i32,
    form: &UpdateClientForm,
) -> ServiceResult<Client>
where
    R: UserReader + ClientReader + ClientWriter + ?Sized,
{
    form.validate()?;
    let updates = UpdateClient::try_from(form)?;
    let client = load_managed_client(repo, caller, client_id)?;

    repo.update_client(client.id, &updates).map_err(|err| {
        log::error!("Failed to update client {}: {err}", client.id);
        err.into()
    })
}

pub fn delete_client<R>(repo: &R, caller: &User, client_id: i32) -> ServiceResult<()>
where
    R: UserReader + ClientReader + ClientWriter + ?Sized,
{
    let client = load_managed_client(repo, caller, client_id)?;

    repo.delete_client(client.id).map_err(|err| {
        log::error!("Failed to delete client {}: {err}", client.id);
        err.into()
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::client::ClientStatus;
    use crate::domain::types::{ContactEmail, ContactName, UserId};
    use crate::domain::user::tests::sample_user;
    use crate::repository::mock::MockRepository;

    fn user(id: i32) -> User {
        match id {
            1 => sample_user(1, None, &[Role::Manager]),
            2 => sample_user(2, Some(1), &[Role::Employee]),
            4 => sample_user(4, None, &[Role::Manager]),
            other => sample_user(other, None, &[Role::Employee]),
        }
    }

    fn client(assigned_to: i32) -> Client {
        Client {
            id: ClientId::new(11).unwrap(),
            name: ContactName::new("Acme Buyer").unwrap(),
            email: ContactEmail::new("buyer@acme.io").unwrap(),
            phone: None,
            company: None,
            address: None,
            status: ClientStatus::Active,
            assigned_to: UserId::new(assigned_to).unwrap(),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn repo_with(stored: Option<Client>) -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|id| Ok(Some(user(id.get()))));
        repo.expect_get_client_by_id()
            .returning(move |_| Ok(stored.clone()));
        repo
    }

    #[test]
    fn manager_of_owner_updates_client() {
        let mut repo = repo_with(Some(client(2)));
        repo.expect_update_client()
            .withf(|_, updates| updates.status == Some(ClientStatus::OnHold))
            .times(1)
            .returning(|_, _| {
                Ok(Client {
                    status: ClientStatus::OnHold,
                    ..client(2)
                })
            });
        let form = UpdateClientForm {
            status: Some("ON_HOLD".to_string()),
            ..UpdateClientForm::default()
        };
        let updated = update_client(&repo, &user(1), 11, &form).unwrap();
        assert_eq!(updated.status, ClientStatus::OnHold);
    }

    #[test]
    fn employees_and_unrelated_managers_are_forbidden() {
        let mut repo = repo_with(Some(client(2)));
        repo.expect_update_client().never();
        repo.expect_delete_client().never();
        let form = UpdateClientForm::default();
        assert!(matches!(
            update_client(&repo, &user(2), 11, &form),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            delete_client(&repo, &user(4), 11),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn missing_client_is_not_found() {
        let repo = repo_with(None);
        assert!(matches!(
            delete_client(&repo, &user(1), 11),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn team_listing_uses_reports_filter() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients()
            .withf(|query| query.assignee == AssigneeFilter::ReportsOf(UserId::new(1).unwrap()))
            .returning(|_| Ok((1, vec![client(2)])));
        let page = list_for_manager_team(&repo, &user(1), &ListQuery::default()).unwrap();
        assert_eq!(page.items.len(), 1);
    }
}
