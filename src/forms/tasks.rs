use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use crate::domain::task::{NewTask, TaskPriority, TaskStatus, UpdateTask};
use crate::domain::types::{LeadId, TaskDescription, TaskTitle, UserId};
use crate::forms::{FieldResult, FormError, double_option, parse_opt};

#[derive(Debug, Deserialize, Validate)]
/// Payload for creating a task.
pub struct AddTaskForm {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    /// ISO-8601 UTC timestamp without offset, e.g. `2030-01-01T09:00:00`.
    pub due_date: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub lead_id: Option<i32>,
    pub assigned_to: Option<i32>,
}

impl AddTaskForm {
    pub fn requested_assignee(&self) -> Result<Option<UserId>, FormError> {
        self.assigned_to
            .map(UserId::new)
            .transpose()
            .field("assigned_to")
    }

    pub fn lead_id(&self) -> Result<Option<LeadId>, FormError> {
        self.lead_id.map(LeadId::new).transpose().field("lead_id")
    }

    pub fn to_new_task(
        &self,
        assigned_to: UserId,
        assigned_by: UserId,
        now: NaiveDateTime,
    ) -> Result<NewTask, FormError> {
        Ok(NewTask {
            title: TaskTitle::new(self.title.as_str()).field("title")?,
            description: parse_opt(
                self.description.as_deref(),
                "description",
                TaskDescription::new,
            )?,
            due_date: self.due_date,
            status: parse_opt(self.status.as_deref(), "status", str::parse::<TaskStatus>)?
                .unwrap_or(TaskStatus::Todo),
            priority: parse_opt(
                self.priority.as_deref(),
                "priority",
                str::parse::<TaskPriority>,
            )?
            .unwrap_or(TaskPriority::Medium),
            lead_id: self.lead_id()?,
            assigned_to,
            assigned_by,
            created_at: now,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Partial task update. `description`, `due_date` and `lead_id` accept
/// `null` to clear the stored value.
pub struct UpdateTaskForm {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDateTime>>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub lead_id: Option<Option<i32>>,
    pub assigned_to: Option<i32>,
    pub assigned_by: Option<i32>,
}

impl UpdateTaskForm {
    pub fn requested_assignee(&self) -> Result<Option<UserId>, FormError> {
        self.assigned_to
            .map(UserId::new)
            .transpose()
            .field("assigned_to")
    }

    pub fn requested_assigner(&self) -> Result<Option<UserId>, FormError> {
        self.assigned_by
            .map(UserId::new)
            .transpose()
            .field("assigned_by")
    }

    /// Due date only when one is being set, for the future-date rule.
    pub fn new_due_date(&self) -> Option<NaiveDateTime> {
        self.due_date.flatten()
    }

    /// Lead to link when one is being set.
    pub fn new_lead_id(&self) -> Result<Option<LeadId>, FormError> {
        self.lead_id
            .flatten()
            .map(LeadId::new)
            .transpose()
            .field("lead_id")
    }

    /// Field changes only. Assignment columns are filled in by the caller's
    /// role-specific rules.
    pub fn to_update_task(&self, now: NaiveDateTime) -> Result<UpdateTask, FormError> {
        Ok(UpdateTask {
            title: parse_opt(self.title.as_deref(), "title", TaskTitle::new)?,
            description: self
                .description
                .as_ref()
                .map(|description| description.as_deref().map(TaskDescription::new).transpose())
                .transpose()
                .field("description")?,
            due_date: self.due_date,
            status: parse_opt(self.status.as_deref(), "status", str::parse::<TaskStatus>)?,
            priority: parse_opt(
                self.priority.as_deref(),
                "priority",
                str::parse::<TaskPriority>,
            )?,
            lead_id: self
                .lead_id
                .map(|lead| lead.map(LeadId::new).transpose())
                .transpose()
                .field("lead_id")?,
            ..UpdateTask::touch(now)
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn new_task_defaults() {
        let form = AddTaskForm {
            title: "Call".to_string(),
            description: None,
            due_date: None,
            status: None,
            priority: None,
            lead_id: None,
            assigned_to: None,
        };
        let me = UserId::new(1).unwrap();
        let task = form.to_new_task(me, me, Utc::now().naive_utc()).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.lead_id.is_none());
    }

    #[test]
    fn update_task_form_handles_nulls() {
        let due = Utc::now().naive_utc() + Duration::days(2);
        let json = format!(
            r#"{{"lead_id":null,"due_date":"{}","priority":"urgent"}}"#,
            due.format("%Y-%m-%dT%H:%M:%S")
        );
        let form: UpdateTaskForm = serde_json::from_str(&json).unwrap();
        assert!(form.new_due_date().is_some());
        assert!(form.new_lead_id().unwrap().is_none());

        let update = form.to_update_task(Utc::now().naive_utc()).unwrap();
        assert_eq!(update.lead_id, Some(None));
        assert_eq!(update.priority, Some(TaskPriority::Urgent));
        assert!(update.assigned_to.is_none());
        assert!(update.description.is_none());
    }

    #[test]
    fn invalid_lead_id_is_rejected() {
        let form = UpdateTaskForm {
            lead_id: Some(Some(0)),
            ..UpdateTaskForm::default()
        };
        assert!(matches!(
            form.to_update_task(Utc::now().naive_utc()),
            Err(FormError::InvalidField { field: "lead_id", .. })
        ));
    }
}
