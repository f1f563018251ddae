use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::client::{Client, UpdateClient};
use crate::domain::types::ClientId;
use crate::models::client::{Client as DbClient, UpdateClient as DbUpdateClient};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    AssigneeFilter, ClientListQuery, ClientReader, ClientWriter, DieselRepository,
};
use crate::schema::{clients, users};

fn filtered(query: &ClientListQuery) -> clients::BoxedQuery<'static, Sqlite> {
    let mut items = clients::table.into_boxed();
    match query.assignee {
        AssigneeFilter::Everyone => {}
        AssigneeFilter::User(user_id) => {
            items = items.filter(clients::assigned_to.eq(user_id.get()));
        }
        AssigneeFilter::ReportsOf(manager_id) => {
            items = items.filter(
                clients::assigned_to.eq_any(
                    users::table
                        .filter(users::manager_id.eq(manager_id.get()))
                        .select(users::id),
                ),
            );
        }
    }
    if let Some(status) = query.status {
        items = items.filter(clients::status.eq(status.as_str()));
    }
    items
}

impl ClientReader for DieselRepository {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>> {
        let mut conn = self.conn()?;
        let client = clients::table
            .find(id.get())
            .select(DbClient::as_select())
            .first::<DbClient>(&mut conn)
            .optional()?;

        Ok(client.map(Client::try_from).transpose()?)
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order(clients::id.asc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let clients = items
            .select(DbClient::as_select())
            .load::<DbClient>(&mut conn)?
            .into_iter()
            .map(Client::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, clients))
    }
}

impl ClientWriter for DieselRepository {
    fn update_client(
        &self,
        client_id: ClientId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client> {
        if updates.is_empty() {
            return self
                .get_client_by_id(client_id)?
                .ok_or(RepositoryError::NotFound);
        }

        let mut conn = self.conn()?;
        let db_updates = DbUpdateClient::from(updates);

        let updated = diesel::update(clients::table.find(client_id.get()))
            .set(&db_updates)
            .returning(DbClient::as_returning())
            .get_result::<DbClient>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn delete_client(&self, client_id: ClientId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(clients::table.find(client_id.get())).execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
