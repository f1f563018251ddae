use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::task::{NewTask, Task, TaskWithLead, UpdateTask};
use crate::domain::types::TaskId;
use crate::models::task::{
    LeadSummaryRow, NewTask as DbNewTask, Task as DbTask, UpdateTask as DbUpdateTask,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AssigneeFilter, DieselRepository, TaskListQuery, TaskReader, TaskWriter};
use crate::schema::{leads, tasks, users};

pub(crate) fn tasks_for(assignee: AssigneeFilter) -> tasks::BoxedQuery<'static, Sqlite> {
    let query = tasks::table.into_boxed();
    match assignee {
        AssigneeFilter::Everyone => query,
        AssigneeFilter::User(user_id) => query.filter(tasks::assigned_to.eq(user_id.get())),
        AssigneeFilter::ReportsOf(manager_id) => query.filter(
            tasks::assigned_to.eq_any(
                users::table
                    .filter(users::manager_id.eq(manager_id.get()))
                    .select(users::id),
            ),
        ),
    }
}

fn filtered(query: &TaskListQuery) -> tasks::BoxedQuery<'static, Sqlite> {
    let mut items = tasks_for(query.assignee);
    if let Some(status) = query.status {
        items = items.filter(tasks::status.eq(status.as_str()));
    }
    items
}

impl TaskReader for DieselRepository {
    fn get_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        let mut conn = self.conn()?;
        let task = tasks::table
            .find(id.get())
            .select(DbTask::as_select())
            .first::<DbTask>(&mut conn)
            .optional()?;

        Ok(task.map(Task::try_from).transpose()?)
    }

    fn list_tasks(&self, query: TaskListQuery) -> RepositoryResult<(usize, Vec<TaskWithLead>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order((tasks::updated_at.desc(), tasks::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let rows = items.select(DbTask::as_select()).load::<DbTask>(&mut conn)?;

        let lead_ids: Vec<i32> = rows.iter().filter_map(|task| task.lead_id).collect();
        let mut linked: HashMap<i32, LeadSummaryRow> = leads::table
            .filter(leads::id.eq_any(&lead_ids))
            .select((leads::id, leads::name, leads::company))
            .load::<LeadSummaryRow>(&mut conn)?
            .into_iter()
            .map(|row| (row.0, row))
            .collect();

        let tasks = rows
            .into_iter()
            .map(|task| {
                let lead = task.lead_id.and_then(|id| linked.remove(&id));
                TaskWithLead::try_from((task, lead)).map_err(RepositoryError::from)
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, tasks))
    }
}

impl TaskWriter for DieselRepository {
    fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task> {
        let mut conn = self.conn()?;
        let insertable = DbNewTask::from(new_task);

        let created = diesel::insert_into(tasks::table)
            .values(&insertable)
            .returning(DbTask::as_returning())
            .get_result::<DbTask>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_task(&self, task_id: TaskId, updates: &UpdateTask) -> RepositoryResult<Task> {
        let mut conn = self.conn()?;
        let db_updates = DbUpdateTask::from(updates);

        let updated = diesel::update(tasks::table.find(task_id.get()))
            .set(&db_updates)
            .returning(DbTask::as_returning())
            .get_result::<DbTask>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn delete_task(&self, task_id: TaskId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let affected = diesel::delete(tasks::table.find(task_id.get())).execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
