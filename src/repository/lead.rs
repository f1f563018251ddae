use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::client::{Client, NewClient};
use crate::domain::lead::{Lead, NewLead, UpdateLead};
use crate::domain::types::LeadId;
use crate::models::client::{Client as DbClient, NewClient as DbNewClient};
use crate::models::lead::{Lead as DbLead, NewLead as DbNewLead, UpdateLead as DbUpdateLead};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AssigneeFilter, DieselRepository, LeadListQuery, LeadReader, LeadWriter};
use crate::schema::{clients, leads, users};

/// Leads visible under `assignee`, as a boxed query open for further filters.
pub(crate) fn leads_for(assignee: AssigneeFilter) -> leads::BoxedQuery<'static, Sqlite> {
    let query = leads::table.into_boxed();
    match assignee {
        AssigneeFilter::Everyone => query,
        AssigneeFilter::User(user_id) => query.filter(leads::assigned_to.eq(user_id.get())),
        AssigneeFilter::ReportsOf(manager_id) => query.filter(
            leads::assigned_to.eq_any(
                users::table
                    .filter(users::manager_id.eq(manager_id.get()))
                    .select(users::id),
            ),
        ),
    }
}

fn filtered(query: &LeadListQuery) -> leads::BoxedQuery<'static, Sqlite> {
    let mut items = leads_for(query.assignee);
    if let Some(status) = query.status {
        items = items.filter(leads::status.eq(status.as_str()));
    }
    if let Some(conversion_status) = query.conversion_status {
        items = items.filter(leads::conversion_status.eq(conversion_status.as_str()));
    }
    items
}

impl LeadReader for DieselRepository {
    fn get_lead_by_id(&self, id: LeadId) -> RepositoryResult<Option<Lead>> {
        let mut conn = self.conn()?;
        let lead = leads::table
            .find(id.get())
            .select(DbLead::as_select())
            .first::<DbLead>(&mut conn)
            .optional()?;

        Ok(lead.map(Lead::try_from).transpose()?)
    }

    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order((leads::updated_at.desc(), leads::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let leads = items
            .select(DbLead::as_select())
            .load::<DbLead>(&mut conn)?
            .into_iter()
            .map(Lead::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, leads))
    }
}

impl LeadWriter for DieselRepository {
    fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead> {
        let mut conn = self.conn()?;
        let insertable = DbNewLead::from(new_lead);

        let created = diesel::insert_into(leads::table)
            .values(&insertable)
            .returning(DbLead::as_returning())
            .get_result::<DbLead>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_lead(&self, lead_id: LeadId, updates: &UpdateLead) -> RepositoryResult<Lead> {
        let mut conn = self.conn()?;
        let db_updates = DbUpdateLead::from(updates);

        let updated = diesel::update(leads::table.find(lead_id.get()))
            .set(&db_updates)
            .returning(DbLead::as_returning())
            .get_result::<DbLead>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn delete_lead(&self, lead_id: LeadId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(leads::table.find(lead_id.get())).execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn convert_lead(&self, lead_id: LeadId, client: &NewClient) -> RepositoryResult<Client> {
        let mut conn = self.conn()?;
        let insertable = DbNewClient::from(client);

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(clients::table)
                .values(&insertable)
                .returning(DbClient::as_returning())
                .get_result::<DbClient>(conn)?;

            let removed = diesel::delete(leads::table.find(lead_id.get())).execute(conn)?;
            if removed == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(created.try_into()?)
        })
    }
}
