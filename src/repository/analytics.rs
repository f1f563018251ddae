use diesel::prelude::*;

use crate::domain::task::TaskStatus;
use crate::domain::types::UserId;
use crate::repository::errors::RepositoryResult;
use crate::repository::lead::leads_for;
use crate::repository::task::tasks_for;
use crate::repository::{AnalyticsReader, AssigneeFilter, DieselRepository};
use crate::schema::{tasks, user_roles, users};

impl AnalyticsReader for DieselRepository {
    fn count_leads(&self, assignee: AssigneeFilter) -> RepositoryResult<i64> {
        let mut conn = self.conn()?;
        Ok(leads_for(assignee).count().get_result(&mut conn)?)
    }

    fn count_tasks(
        &self,
        assignee: AssigneeFilter,
        status: Option<TaskStatus>,
    ) -> RepositoryResult<i64> {
        let mut conn = self.conn()?;
        let mut query = tasks_for(assignee);
        if let Some(status) = status {
            query = query.filter(tasks::status.eq(status.as_str()));
        }
        Ok(query.count().get_result(&mut conn)?)
    }

    fn count_users(&self, manager_id: Option<UserId>) -> RepositoryResult<i64> {
        let mut conn = self.conn()?;
        let mut query = users::table.into_boxed();
        if let Some(manager_id) = manager_id {
            query = query.filter(users::manager_id.eq(manager_id.get()));
        }
        Ok(query.count().get_result(&mut conn)?)
    }

    fn count_users_with_role(&self, role: &str) -> RepositoryResult<i64> {
        let mut conn = self.conn()?;
        Ok(user_roles::table
            .filter(user_roles::role.eq(role))
            .count()
            .get_result(&mut conn)?)
    }
}
