use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::task::{
    LinkedLead, NewTask as DomainNewTask, Task as DomainTask, TaskWithLead,
    UpdateTask as DomainUpdateTask,
};
use crate::domain::types::{
    CompanyName, ContactName, LeadId, TaskDescription, TaskId, TaskTitle, TypeConstraintError,
    UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tasks)]
/// Diesel model for [`crate::domain::task::Task`].
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub status: String,
    pub priority: String,
    pub lead_id: Option<i32>,
    pub assigned_to: i32,
    pub assigned_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// `(id, name, company)` of a linked lead as selected by listings.
pub type LeadSummaryRow = (i32, String, Option<String>);

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tasks)]
/// Insertable form of [`Task`].
pub struct NewTask<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub due_date: Option<NaiveDateTime>,
    pub status: &'a str,
    pub priority: &'a str,
    pub lead_id: Option<i32>,
    pub assigned_to: i32,
    pub assigned_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::tasks)]
/// Data used when updating a [`Task`] record.
pub struct UpdateTask<'a> {
    pub title: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub due_date: Option<Option<NaiveDateTime>>,
    pub status: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub lead_id: Option<Option<i32>>,
    pub assigned_to: Option<i32>,
    pub assigned_by: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Task> for DomainTask {
    type Error = TypeConstraintError;

    fn try_from(task: Task) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaskId::try_from(task.id)?,
            title: TaskTitle::new(task.title)?,
            description: task.description.map(TaskDescription::new).transpose()?,
            due_date: task.due_date,
            status: task.status.parse()?,
            priority: task.priority.parse()?,
            lead_id: task.lead_id.map(LeadId::try_from).transpose()?,
            assigned_to: UserId::try_from(task.assigned_to)?,
            assigned_by: UserId::try_from(task.assigned_by)?,
            created_at: task.created_at,
            updated_at: task.updated_at,
        })
    }
}

impl TryFrom<(Task, Option<LeadSummaryRow>)> for TaskWithLead {
    type Error = TypeConstraintError;

    fn try_from((task, lead): (Task, Option<LeadSummaryRow>)) -> Result<Self, Self::Error> {
        let lead = lead
            .map(|(id, name, company)| {
                Ok::<_, TypeConstraintError>(LinkedLead {
                    id: LeadId::try_from(id)?,
                    name: ContactName::new(name)?,
                    company: company.map(CompanyName::new).transpose()?,
                })
            })
            .transpose()?;
        Ok(Self {
            task: task.try_into()?,
            lead,
        })
    }
}

impl<'a> From<&'a DomainNewTask> for NewTask<'a> {
    fn from(task: &'a DomainNewTask) -> Self {
        Self {
            title: task.title.as_str(),
            description: task.description.as_ref().map(|v| v.as_str()),
            due_date: task.due_date,
            status: task.status.as_str(),
            priority: task.priority.as_str(),
            lead_id: task.lead_id.map(LeadId::get),
            assigned_to: task.assigned_to.get(),
            assigned_by: task.assigned_by.get(),
            created_at: task.created_at,
            updated_at: task.created_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateTask> for UpdateTask<'a> {
    fn from(task: &'a DomainUpdateTask) -> Self {
        Self {
            title: task.title.as_ref().map(|v| v.as_str()),
            description: task
                .description
                .as_ref()
                .map(|description| description.as_ref().map(|v| v.as_str())),
            due_date: task.due_date,
            status: task.status.map(|status| status.as_str()),
            priority: task.priority.map(|priority| priority.as_str()),
            lead_id: task.lead_id.map(|lead| lead.map(LeadId::get)),
            assigned_to: task.assigned_to.map(UserId::get),
            assigned_by: task.assigned_by.map(UserId::get),
            updated_at: task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::task::{TaskPriority, TaskStatus};

    fn row() -> Task {
        let now = Utc::now().naive_utc();
        Task {
            id: 9,
            title: "Call back".to_string(),
            description: None,
            due_date: None,
            status: "IN_PROGRESS".to_string(),
            priority: "HIGH".to_string(),
            lead_id: Some(2),
            assigned_to: 3,
            assigned_by: 2,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn task_with_linked_lead_into_domain() {
        let item = TaskWithLead::try_from((
            row(),
            Some((2, "Jane".to_string(), Some("Buyer".to_string()))),
        ))
        .unwrap();
        assert_eq!(item.task.status, TaskStatus::InProgress);
        assert_eq!(item.task.priority, TaskPriority::High);
        let lead = item.lead.unwrap();
        assert_eq!(lead.id.get(), 2);
        assert_eq!(lead.company.unwrap().as_str(), "Buyer");
    }

    #[test]
    fn unlinked_task_has_no_lead() {
        let mut task = row();
        task.lead_id = None;
        let item = TaskWithLead::try_from((task, None)).unwrap();
        assert!(item.lead.is_none());
    }
}
